//! Comment endpoints.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use galerie_common::AppResult;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Comment request.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// Comment response: the stored line, alias included.
#[derive(Serialize)]
pub struct CommentResponse {
    pub comment: String,
}

/// Comment on a file. Commenting on another user's media requires a
/// grant with comment rights.
async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((owner_id, filename)): Path<(String, String)>,
    Json(req): Json<CommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .add(&user, &owner_id, &filename, &req.text)
        .await?;
    Ok(ApiResponse::ok(CommentResponse { comment }))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/galleries/{owner_id}/media/{filename}/comments",
        post(add_comment),
    )
}
