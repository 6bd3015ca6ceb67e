//! Tag endpoints.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use galerie_common::AppResult;
use galerie_core::{RenameOutcome, TagOutcome};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Tag add/remove request.
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub tag: String,
}

/// Tag rename request.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub from: String,
    pub to: String,
}

/// Add a tag to one of the caller's files.
async fn add_tag(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(req): Json<TagRequest>,
) -> AppResult<ApiResponse<TagOutcome>> {
    let outcome = state.tag_service.add(&user, &filename, &req.tag).await?;
    Ok(ApiResponse::ok(outcome))
}

/// Remove a tag (all case variants) from one of the caller's files.
async fn remove_tag(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(req): Json<TagRequest>,
) -> AppResult<ApiResponse<TagOutcome>> {
    let outcome = state.tag_service.remove(&user, &filename, &req.tag).await?;
    Ok(ApiResponse::ok(outcome))
}

/// Rename a tag on one file.
async fn rename_tag(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(req): Json<RenameRequest>,
) -> AppResult<ApiResponse<RenameOutcome>> {
    let outcome = state
        .tag_service
        .rename(&user, &filename, &req.from, &req.to)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

/// Rename a tag across the caller's whole gallery.
async fn rename_tag_global(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RenameRequest>,
) -> AppResult<ApiResponse<RenameOutcome>> {
    let outcome = state
        .tag_service
        .rename_global(&user, &req.from, &req.to)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media/{filename}/tags", post(add_tag).delete(remove_tag))
        .route("/media/{filename}/tags/rename", post(rename_tag))
        .route("/tags/rename", post(rename_tag_global))
}
