//! Shared fixtures for service tests.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;

use galerie_common::{AppError, AppResult};
use galerie_db::entities::{shared_access, user};

use super::MediaCodec;

pub fn user(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        username_lower: username.to_lowercase(),
        email: format!("{username}@example.com"),
        password_hash: "hashed".to_string(),
        token: Some(format!("token-{id}")),
        is_verified: true,
        created_at: Utc::now().into(),
    }
}

pub fn grant(
    owner_id: &str,
    grantee_id: &str,
    alias: &str,
    can_upload: bool,
    can_comment: bool,
) -> shared_access::Model {
    shared_access::Model {
        id: format!("grant-{owner_id}-{grantee_id}"),
        owner_id: owner_id.to_string(),
        grantee_id: grantee_id.to_string(),
        alias: alias.to_string(),
        can_upload,
        can_comment,
        created_at: Utc::now().into(),
    }
}

/// A valid PNG frame for thumbnail pipelines.
pub fn png_frame() -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(64, 48);
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Codec that converts by copying bytes and always produces a frame.
pub struct StubCodec;

#[async_trait]
impl MediaCodec for StubCodec {
    async fn heic_to_jpeg(&self, source: &Path, dest: &Path) -> AppResult<()> {
        tokio::fs::copy(source, dest)
            .await
            .map_err(|e| AppError::Codec(e.to_string()))?;
        Ok(())
    }

    async fn video_duration_secs(&self, _source: &Path) -> AppResult<f64> {
        Ok(10.0)
    }

    async fn extract_frame(&self, _source: &Path, _at_secs: f64) -> AppResult<Vec<u8>> {
        Ok(png_frame())
    }
}

/// Codec whose every operation fails.
pub struct FailingCodec;

#[async_trait]
impl MediaCodec for FailingCodec {
    async fn heic_to_jpeg(&self, _source: &Path, _dest: &Path) -> AppResult<()> {
        Err(AppError::Codec("decode failed".to_string()))
    }

    async fn video_duration_secs(&self, _source: &Path) -> AppResult<f64> {
        Err(AppError::Codec("probe failed".to_string()))
    }

    async fn extract_frame(&self, _source: &Path, _at_secs: f64) -> AppResult<Vec<u8>> {
        Err(AppError::Codec("extract failed".to_string()))
    }
}
