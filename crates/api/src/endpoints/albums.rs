//! Album endpoints.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use galerie_common::AppResult;
use galerie_core::FavoriteAction;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Album creation request.
#[derive(Debug, Deserialize)]
pub struct CreateAlbumRequest {
    pub title: String,
}

/// Album creation response.
#[derive(Serialize)]
pub struct CreateAlbumResponse {
    pub title: String,
}

/// Create an empty album.
async fn create_album(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateAlbumRequest>,
) -> AppResult<ApiResponse<CreateAlbumResponse>> {
    let title = state.album_service.create(&user, &req.title).await?;
    Ok(ApiResponse::ok(CreateAlbumResponse { title }))
}

/// Favorite toggle response.
#[derive(Serialize)]
pub struct FavoriteResponse {
    pub action: FavoriteAction,
}

/// Flip an album's membership in the caller's favorites.
async fn toggle_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<ApiResponse<FavoriteResponse>> {
    let action = state.album_service.toggle_favorite(&user, &title).await?;
    Ok(ApiResponse::ok(FavoriteResponse { action }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/albums", post(create_album))
        .route("/albums/{title}/favorite", post(toggle_favorite))
}
