//! API middleware and shared state.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use galerie_core::{
    AlbumService, CommentService, GalleryService, MediaService, ShareService, TagService,
    UserService,
};

/// Application state shared by every endpoint.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub gallery_service: GalleryService,
    pub media_service: MediaService,
    pub tag_service: TagService,
    pub album_service: AlbumService,
    pub comment_service: CommentService,
    pub share_service: ShareService,
}

/// Authentication middleware.
///
/// Resolves a `Authorization: Bearer <token>` header to an account and
/// stashes it in request extensions. Requests without a valid token pass
/// through unauthenticated; protected endpoints reject them via
/// [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if let Ok(user) = state.user_service.authenticate_by_token(token).await {
                    req.extensions_mut().insert(user);
                }
            }
        }
    }

    next.run(req).await
}
