//! API endpoints.

mod albums;
mod auth;
mod comments;
mod gallery;
mod media;
mod share;
mod tags;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(gallery::router())
        .merge(media::router())
        .merge(tags::router())
        .merge(albums::router())
        .merge(comments::router())
        .merge(share::router())
}
