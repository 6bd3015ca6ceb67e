//! Media file operations: upload batches, deletion, descriptions and
//! raw file serving.
//!
//! Files live under one directory per owner id. Uploaded files never keep
//! their client-supplied names; each accepted payload is stored under a
//! generated opaque filename. HEIC images are converted to JPEG on the way
//! in, and videos get a derived JPEG thumbnail in the shared thumbnail
//! directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use galerie_common::media_kind::{extension_of, mime_type_of};
use galerie_common::{AppError, AppResult, IdGenerator, MediaConfig, MediaKind};
use galerie_db::entities::user;
use galerie_db::repositories::SharedAccessRepository;

use super::codec::MediaCodec;
use super::metadata::MetadataStore;

/// One file in an upload batch.
pub struct FilePayload {
    /// Client-supplied name, used only for its extension.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// An upload request: a batch of payloads plus an optional album choice.
#[derive(Default)]
pub struct UploadInput {
    /// Existing album title selected for the batch.
    pub album: Option<String>,
    /// Newly coined album title; wins over `album` when both are given.
    pub new_album: Option<String>,
    pub files: Vec<FilePayload>,
}

impl UploadInput {
    fn effective_album(&self) -> Option<&str> {
        fn pick(s: &Option<String>) -> Option<&str> {
            s.as_deref().map(str::trim).filter(|t| !t.is_empty())
        }
        pick(&self.new_album).or_else(|| pick(&self.album))
    }
}

/// A payload accepted by an upload, under its generated filename.
#[derive(Debug, Clone, Serialize)]
pub struct SavedFile {
    pub filename: String,
    pub kind: MediaKind,
}

/// Result of an upload batch. Partial success is the normal outcome:
/// disallowed or undecodable payloads land in `skipped` under their
/// original names.
#[derive(Debug, Default, Serialize)]
pub struct UploadOutcome {
    pub saved: Vec<SavedFile>,
    pub skipped: Vec<String>,
}

/// Service for media file operations.
#[derive(Clone)]
pub struct MediaService {
    share_repo: SharedAccessRepository,
    store: MetadataStore,
    codec: Arc<dyn MediaCodec>,
    id_gen: IdGenerator,
    media: MediaConfig,
}

impl MediaService {
    pub fn new(
        share_repo: SharedAccessRepository,
        store: MetadataStore,
        codec: Arc<dyn MediaCodec>,
        id_gen: IdGenerator,
        media: MediaConfig,
    ) -> Self {
        Self {
            share_repo,
            store,
            codec,
            id_gen,
            media,
        }
    }

    /// Directory holding an owner's media files.
    #[must_use]
    pub fn user_dir(&self, owner_id: &str) -> PathBuf {
        self.media.upload_dir.join(owner_id)
    }

    /// Upload a batch of files into `owner_id`'s gallery.
    ///
    /// Uploading into someone else's gallery requires a grant from that
    /// owner with `can_upload` set; the grant's alias is then used in the
    /// seeded upload comment. All accepted files are registered in the
    /// metadata documents in one update at the end of the batch.
    pub async fn upload(
        &self,
        actor: &user::Model,
        owner_id: &str,
        input: UploadInput,
    ) -> AppResult<UploadOutcome> {
        let alias = self.contributor_alias(actor, owner_id).await?;

        let dir = self.user_dir(owner_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| internal_io(&dir, &e))?;

        let album = input.effective_album().map(str::to_string);
        let mut saved = Vec::new();
        let mut skipped = Vec::new();

        for payload in &input.files {
            match self.save_one(&dir, payload).await? {
                Some(file) => saved.push(file),
                None => skipped.push(payload.filename.clone()),
            }
        }

        if !saved.is_empty() {
            let names: Vec<String> = saved.iter().map(|f| f.filename.clone()).collect();
            self.store
                .update(move |docs| {
                    for name in &names {
                        docs.register_upload(name, album.as_deref(), &alias);
                    }
                    Ok(())
                })
                .await?;
        }

        info!(
            owner_id,
            actor_id = %actor.id,
            saved = saved.len(),
            skipped = skipped.len(),
            "upload batch processed"
        );

        Ok(UploadOutcome { saved, skipped })
    }

    /// Delete a file from the owner's own gallery, along with any cached
    /// thumbnail and all four metadata entries.
    ///
    /// Deleting a filename that does not exist on disk fails without
    /// touching the metadata documents.
    pub async fn delete(&self, owner: &user::Model, filename: &str) -> AppResult<()> {
        validate_filename(filename)?;

        let path = self.user_dir(&owner.id).join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::FileNotFound(filename.to_string()));
            }
            Err(e) => return Err(internal_io(&path, &e)),
        }

        if MediaKind::from_filename(filename) == Some(MediaKind::Video) {
            if let Some((stem, _)) = filename.rsplit_once('.') {
                let thumb = self.media.thumbnail_dir.join(format!("{stem}.jpg"));
                if let Err(e) = tokio::fs::remove_file(&thumb).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %thumb.display(), error = %e, "thumbnail removal failed");
                    }
                }
            }
        }

        self.store
            .update(|docs| {
                docs.remove_file(filename);
                Ok(())
            })
            .await?;

        info!(owner_id = %owner.id, filename, "media deleted");
        Ok(())
    }

    /// Set the description of a file in the owner's own gallery.
    pub async fn set_description(
        &self,
        owner: &user::Model,
        filename: &str,
        text: &str,
    ) -> AppResult<()> {
        validate_filename(filename)?;
        self.ensure_exists(&owner.id, filename).await?;

        let text = text.trim().to_string();
        self.store
            .update(move |docs| {
                if docs.description_of(filename) != text {
                    docs.descriptions_mut().insert(filename.to_string(), text);
                }
                Ok(())
            })
            .await
    }

    /// Read a media file's bytes and MIME type for serving.
    pub async fn read_media(
        &self,
        owner_id: &str,
        filename: &str,
    ) -> AppResult<(Vec<u8>, &'static str)> {
        validate_filename(filename)?;
        let path = self.user_dir(owner_id).join(filename);
        read_file(&path, filename).await
    }

    /// Read a cached thumbnail's bytes and MIME type for serving.
    pub async fn read_thumbnail(&self, filename: &str) -> AppResult<(Vec<u8>, &'static str)> {
        validate_filename(filename)?;
        let path = self.media.thumbnail_dir.join(filename);
        read_file(&path, filename).await
    }

    /// Resolve the display alias for a contribution into `owner_id`'s
    /// gallery, enforcing the upload capability for delegates.
    async fn contributor_alias(&self, actor: &user::Model, owner_id: &str) -> AppResult<String> {
        if actor.id == owner_id {
            return Ok(actor.username.clone());
        }

        let grant = self
            .share_repo
            .find_by_pair(owner_id, &actor.id)
            .await?
            .ok_or_else(|| AppError::Forbidden("No access to this gallery".to_string()))?;

        if !grant.can_upload {
            return Err(AppError::Forbidden(
                "Uploads are not permitted for this gallery".to_string(),
            ));
        }

        Ok(grant.alias)
    }

    /// Store one payload, returning `None` when it is skipped (disallowed
    /// extension, or a HEIC that failed to convert).
    async fn save_one(&self, dir: &Path, payload: &FilePayload) -> AppResult<Option<SavedFile>> {
        let Some(ext) = extension_of(&payload.filename) else {
            warn!(filename = %payload.filename, "skipping file without extension");
            return Ok(None);
        };
        let Some(kind) = MediaKind::from_extension(&ext) else {
            warn!(filename = %payload.filename, "skipping disallowed extension");
            return Ok(None);
        };

        let file = if ext == "heic" {
            let filename = self.id_gen.generate_media_filename("jpg");
            let dest = dir.join(&filename);
            let staging = dir.join(format!("{filename}.heic"));

            tokio::fs::write(&staging, &payload.bytes)
                .await
                .map_err(|e| internal_io(&staging, &e))?;
            let converted = self.codec.heic_to_jpeg(&staging, &dest).await;
            let _ = tokio::fs::remove_file(&staging).await;

            if let Err(e) = converted {
                warn!(filename = %payload.filename, error = %e, "heic conversion failed, skipping");
                let _ = tokio::fs::remove_file(&dest).await;
                return Ok(None);
            }

            SavedFile { filename, kind }
        } else {
            let filename = self.id_gen.generate_media_filename(&ext);
            let dest = dir.join(&filename);
            tokio::fs::write(&dest, &payload.bytes)
                .await
                .map_err(|e| internal_io(&dest, &e))?;
            SavedFile { filename, kind }
        };

        if file.kind == MediaKind::Video {
            // The video stays even when its thumbnail cannot be produced.
            if let Err(e) = self.generate_thumbnail(dir, &file.filename).await {
                warn!(filename = %file.filename, error = %e, "thumbnail generation failed");
            }
        }

        Ok(Some(file))
    }

    /// Produce the JPEG thumbnail for a stored video: a frame from the
    /// temporal midpoint (0.1s for sub-second clips), scaled to the
    /// configured width.
    async fn generate_thumbnail(&self, dir: &Path, filename: &str) -> AppResult<()> {
        let source = dir.join(filename);

        let duration = self.codec.video_duration_secs(&source).await?;
        let at = if duration <= 1.0 { 0.1 } else { duration / 2.0 };
        let frame = self.codec.extract_frame(&source, at).await?;

        let width = self.media.thumbnail_width;
        let jpeg = tokio::task::spawn_blocking(move || encode_thumbnail(&frame, width))
            .await
            .map_err(|e| AppError::Internal(format!("thumbnail task: {e}")))??;

        tokio::fs::create_dir_all(&self.media.thumbnail_dir)
            .await
            .map_err(|e| internal_io(&self.media.thumbnail_dir, &e))?;

        let stem = filename.rsplit_once('.').map_or(filename, |(s, _)| s);
        let dest = self.media.thumbnail_dir.join(format!("{stem}.jpg"));
        tokio::fs::write(&dest, &jpeg)
            .await
            .map_err(|e| internal_io(&dest, &e))?;

        Ok(())
    }

    async fn ensure_exists(&self, owner_id: &str, filename: &str) -> AppResult<()> {
        ensure_media_exists(&self.media, owner_id, filename).await
    }
}

/// Fail with not-found unless the file is present in the owner's
/// directory.
pub(crate) async fn ensure_media_exists(
    media: &MediaConfig,
    owner_id: &str,
    filename: &str,
) -> AppResult<()> {
    let path = media.upload_dir.join(owner_id).join(filename);
    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| internal_io(&path, &e))?;
    if exists {
        Ok(())
    } else {
        Err(AppError::FileNotFound(filename.to_string()))
    }
}

/// Reject anything that could escape the owner's directory. Stored
/// filenames are generated, so a legitimate request never trips this.
pub(crate) fn validate_filename(filename: &str) -> AppResult<()> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(AppError::BadRequest("Invalid filename".to_string()));
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn encode_thumbnail(frame: &[u8], width: u32) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(frame)
        .map_err(|e| AppError::Codec(format!("frame decode: {e}")))?;

    let scale = f64::from(width) / f64::from(img.width().max(1));
    let height = (f64::from(img.height()) * scale).round().max(1.0) as u32;
    let thumb = img.resize_exact(width, height, image::imageops::FilterType::Lanczos3);

    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(thumb.to_rgb8())
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .map_err(|e| AppError::Codec(format!("thumbnail encode: {e}")))?;
    Ok(out.into_inner())
}

async fn read_file(path: &Path, filename: &str) -> AppResult<(Vec<u8>, &'static str)> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok((bytes, mime_type_of(filename))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::FileNotFound(filename.to_string()))
        }
        Err(e) => Err(internal_io(path, &e)),
    }
}

fn internal_io(path: &Path, e: &std::io::Error) -> AppError {
    AppError::Internal(format!("{}: {e}", path.display()))
}
