//! Gallery browsing endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};

use galerie_common::AppResult;
use galerie_core::{AlbumSummary, GalleryFilter, MediaEntry};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// List the caller's own media, newest first. Supports `?tag=` (exact
/// membership) and `?search=` (substring over filename, description,
/// album and tags).
async fn index(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<GalleryFilter>,
) -> AppResult<ApiResponse<Vec<MediaEntry>>> {
    let entries = state.gallery_service.list(&user, &filter).await?;
    Ok(ApiResponse::ok(entries))
}

/// Summarize the caller's albums.
async fn albums(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<AlbumSummary>>> {
    let summaries = state.gallery_service.albums(&user).await?;
    Ok(ApiResponse::ok(summaries))
}

/// The caller's media within one album.
async fn album(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<ApiResponse<Vec<MediaEntry>>> {
    let entries = state.gallery_service.album(&user, &title).await?;
    Ok(ApiResponse::ok(entries))
}

/// Every tag in use, for filter pickers.
async fn all_tags(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<String>>> {
    Ok(ApiResponse::ok(state.gallery_service.all_tags().await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gallery", get(index))
        .route("/gallery/albums", get(albums))
        .route("/gallery/albums/{title}", get(album))
        .route("/gallery/tags", get(all_tags))
}
