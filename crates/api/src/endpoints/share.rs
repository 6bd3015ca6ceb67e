//! Access grant endpoints.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use galerie_common::AppResult;
use galerie_db::entities::shared_access;

use crate::{extractors::AuthUser, middleware::AppState, response, response::ApiResponse};

/// Share request.
#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    /// Username of the user receiving access.
    pub username: String,
    /// Display alias for their contributions; defaults to their username.
    pub alias: Option<String>,
}

/// Grant another user access to the caller's gallery.
async fn share(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShareRequest>,
) -> AppResult<ApiResponse<shared_access::Model>> {
    let grant = state
        .share_service
        .share(&user, &req.username, req.alias)
        .await?;
    Ok(ApiResponse::ok(grant))
}

/// Grants the caller has handed out.
async fn given(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<shared_access::Model>>> {
    Ok(ApiResponse::ok(state.share_service.given(&user).await?))
}

/// Grants the caller has received.
async fn received(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<shared_access::Model>>> {
    Ok(ApiResponse::ok(state.share_service.received(&user).await?))
}

/// Revoke a grant the caller handed out.
async fn revoke(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(grant_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.share_service.revoke(&user, &grant_id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/share", post(share).get(given))
        .route("/share/received", get(received))
        .route("/share/{grant_id}", delete(revoke))
}
