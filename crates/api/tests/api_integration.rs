//! API integration tests.
//!
//! These tests exercise the HTTP surface with a mock database and a
//! temporary media root: routing, authentication middleware, extractors
//! and status mapping.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use galerie_api::{auth_middleware, router as api_router, AppState};
use galerie_common::{IdGenerator, MediaConfig};
use galerie_core::{
    AlbumService, CommentService, FfmpegCodec, GalleryService, MediaService, MetadataStore,
    ShareService, TagService, UserService,
};
use galerie_db::entities::user;
use galerie_db::repositories::{SharedAccessRepository, UserRepository};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tempfile::TempDir;
use tower::ServiceExt;

fn test_user(id: &str, username: &str, token: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        username_lower: username.to_lowercase(),
        email: format!("{username}@example.com"),
        password_hash: "hashed".to_string(),
        token: Some(token.to_string()),
        is_verified: true,
        created_at: Utc::now().into(),
    }
}

fn media_config(dir: &TempDir) -> MediaConfig {
    MediaConfig {
        upload_dir: dir.path().join("uploads"),
        data_dir: dir.path().join("data"),
        thumbnail_dir: dir.path().join("thumbs"),
        thumbnail_width: 320,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        codec_timeout_secs: 5,
    }
}

/// Create test app state over a mock database and a temp media root.
fn create_test_state(dir: &TempDir, db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);
    let media = media_config(dir);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let share_repo = SharedAccessRepository::new(Arc::clone(&db));
    let store = MetadataStore::new(media.data_dir.clone());
    let id_gen = IdGenerator::new();
    let codec = Arc::new(FfmpegCodec::new(&media));

    AppState {
        user_service: UserService::new(user_repo.clone(), id_gen.clone()),
        gallery_service: GalleryService::new(store.clone(), media.clone()),
        media_service: MediaService::new(
            share_repo.clone(),
            store.clone(),
            codec,
            id_gen.clone(),
            media.clone(),
        ),
        tag_service: TagService::new(store.clone(), media.clone()),
        album_service: AlbumService::new(store.clone()),
        comment_service: CommentService::new(share_repo.clone(), store, media),
        share_service: ShareService::new(user_repo, share_repo, id_gen),
    }
}

fn create_test_router(state: AppState) -> Router {
    api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

#[tokio::test]
async fn test_gallery_requires_authentication() {
    let dir = tempfile::tempdir().unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(create_test_state(&dir, db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/gallery")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signin_with_unknown_user_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = create_test_router(create_test_state(&dir, db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signin")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"username":"nobody","password":"wrong"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticated_gallery_listing() {
    let dir = tempfile::tempdir().unwrap();
    let alice = test_user("u1", "alice", "tok123");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[alice]])
        .into_connection();
    let app = create_test_router(create_test_state(&dir, db));

    let user_dir = dir.path().join("uploads").join("u1");
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(user_dir.join("a.jpg"), b"x").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/gallery")
                .method("GET")
                .header("Authorization", "Bearer tok123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_into_own_gallery() {
    let dir = tempfile::tempdir().unwrap();
    let alice = test_user("u1", "alice", "tok123");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[alice]])
        .into_connection();
    let app = create_test_router(create_test_state(&dir, db));

    let boundary = "XGALERIEBOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"files\"; filename=\"pic.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         not-really-png\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/galleries/u1/media")
                .method("POST")
                .header("Authorization", "Bearer tok123")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Exactly one generated file landed in the owner's directory
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("uploads").join("u1"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].ends_with(".png"));
}

#[tokio::test]
async fn test_delete_unknown_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let alice = test_user("u1", "alice", "tok123");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[alice]])
        .into_connection();
    let app = create_test_router(create_test_state(&dir, db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/media/ghost.jpg")
                .method("DELETE")
                .header("Authorization", "Bearer tok123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_viewing_another_users_media_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let eve = test_user("u9", "eve", "tok999");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[eve]])
        .into_connection();
    let app = create_test_router(create_test_state(&dir, db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/galleries/u1/media/a.jpg")
                .method("GET")
                .header("Authorization", "Bearer tok999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_album_and_toggle_favorite() {
    let dir = tempfile::tempdir().unwrap();
    let alice = test_user("u1", "alice", "tok123");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[alice.clone()], [alice]])
        .into_connection();
    let app = create_test_router(create_test_state(&dir, db));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/albums")
                .method("POST")
                .header("Authorization", "Bearer tok123")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"title":"Trip"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/albums/Trip/favorite")
                .method("POST")
                .header("Authorization", "Bearer tok123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
