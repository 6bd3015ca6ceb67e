//! Tag mutations.
//!
//! Matching is case-insensitive everywhere except the duplicate check on
//! add, which compares the literal string. That asymmetry is part of the
//! stored data's established behavior and is kept as-is: "Beach" and
//! "beach" can coexist on one file, but removing "beach" takes both.

use serde::Serialize;

use galerie_common::{AppError, AppResult, MediaConfig};
use galerie_db::entities::user;

use super::media::{ensure_media_exists, validate_filename};
use super::metadata::MetadataStore;

/// Result of an add or remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOutcome {
    Added,
    AlreadyPresent,
    Removed,
    NotPresent,
}

/// Result of a rename; `changed` is false when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    pub changed: bool,
}

/// Service for tag mutations on the owner's own media.
#[derive(Clone)]
pub struct TagService {
    store: MetadataStore,
    media: MediaConfig,
}

impl TagService {
    #[must_use]
    pub const fn new(store: MetadataStore, media: MediaConfig) -> Self {
        Self { store, media }
    }

    /// Add a tag to a file. Adding a tag the file already carries (same
    /// casing) is a no-op.
    pub async fn add(
        &self,
        owner: &user::Model,
        filename: &str,
        tag: &str,
    ) -> AppResult<TagOutcome> {
        let tag = non_empty(tag)?;
        validate_filename(filename)?;
        ensure_media_exists(&self.media, &owner.id, filename).await?;

        self.store
            .update(move |docs| {
                if docs.tags_of(filename).contains(&tag) {
                    return Ok(TagOutcome::AlreadyPresent);
                }
                docs.tags_mut()
                    .entry(filename.to_string())
                    .or_default()
                    .push(tag);
                Ok(TagOutcome::Added)
            })
            .await
    }

    /// Remove a tag from a file, taking every case variant with it.
    pub async fn remove(
        &self,
        owner: &user::Model,
        filename: &str,
        tag: &str,
    ) -> AppResult<TagOutcome> {
        let needle = non_empty(tag)?.to_lowercase();
        validate_filename(filename)?;
        ensure_media_exists(&self.media, &owner.id, filename).await?;

        self.store
            .update(move |docs| {
                if !matches_any(docs.tags_of(filename), &needle) {
                    return Ok(TagOutcome::NotPresent);
                }
                if let Some(tags) = docs.tags_mut().get_mut(filename) {
                    tags.retain(|t| t.to_lowercase() != needle);
                }
                Ok(TagOutcome::Removed)
            })
            .await
    }

    /// Rename a tag on one file: every case variant of `from` becomes the
    /// literal `to`, keeping its list position.
    pub async fn rename(
        &self,
        owner: &user::Model,
        filename: &str,
        from: &str,
        to: &str,
    ) -> AppResult<RenameOutcome> {
        let needle = non_empty(from)?.to_lowercase();
        let to = non_empty(to)?;
        validate_filename(filename)?;
        ensure_media_exists(&self.media, &owner.id, filename).await?;

        self.store
            .update(move |docs| {
                if !matches_any(docs.tags_of(filename), &needle) {
                    return Ok(RenameOutcome { changed: false });
                }
                if let Some(tags) = docs.tags_mut().get_mut(filename) {
                    replace_matches(tags, &needle, &to);
                }
                Ok(RenameOutcome { changed: true })
            })
            .await
    }

    /// Rename a tag across every file in the gallery owner's metadata.
    pub async fn rename_global(
        &self,
        _owner: &user::Model,
        from: &str,
        to: &str,
    ) -> AppResult<RenameOutcome> {
        let needle = non_empty(from)?.to_lowercase();
        let to = non_empty(to)?;

        self.store
            .update(move |docs| {
                let affected: Vec<String> = docs
                    .tags()
                    .iter()
                    .filter(|(_, tags)| matches_any(tags, &needle))
                    .map(|(filename, _)| filename.clone())
                    .collect();

                if affected.is_empty() {
                    return Ok(RenameOutcome { changed: false });
                }

                let map = docs.tags_mut();
                for filename in &affected {
                    if let Some(tags) = map.get_mut(filename) {
                        replace_matches(tags, &needle, &to);
                    }
                }
                Ok(RenameOutcome { changed: true })
            })
            .await
    }
}

fn non_empty(tag: &str) -> AppResult<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(AppError::Validation("Tag cannot be empty".to_string()));
    }
    Ok(tag.to_string())
}

fn matches_any(tags: &[String], needle_lower: &str) -> bool {
    tags.iter().any(|t| t.to_lowercase() == needle_lower)
}

fn replace_matches(tags: &mut [String], needle_lower: &str, to: &str) {
    for tag in tags {
        if tag.to_lowercase() == needle_lower {
            *tag = to.to_string();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::testing;
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> TagService {
        let media = MediaConfig {
            upload_dir: dir.path().join("uploads"),
            data_dir: dir.path().join("data"),
            thumbnail_dir: dir.path().join("thumbs"),
            thumbnail_width: 320,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            codec_timeout_secs: 5,
        };
        TagService::new(MetadataStore::new(media.data_dir.clone()), media)
    }

    fn touch(dir: &TempDir, owner: &str, filename: &str) {
        let user_dir = dir.path().join("uploads").join(owner);
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join(filename), b"x").unwrap();
    }

    async fn tags_of(svc: &TagService, filename: &str) -> Vec<String> {
        svc.store.load().await.unwrap().tags_of(filename).to_vec()
    }

    #[tokio::test]
    async fn test_add_duplicate_check_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");
        touch(&dir, "u1", "a.jpg");

        assert_eq!(
            svc.add(&alice, "a.jpg", "Beach").await.unwrap(),
            TagOutcome::Added
        );
        assert_eq!(
            svc.add(&alice, "a.jpg", "Beach").await.unwrap(),
            TagOutcome::AlreadyPresent
        );
        // Different casing slips past the duplicate check
        assert_eq!(
            svc.add(&alice, "a.jpg", "beach").await.unwrap(),
            TagOutcome::Added
        );
        assert_eq!(tags_of(&svc, "a.jpg").await, ["Beach", "beach"]);
    }

    #[tokio::test]
    async fn test_add_rejects_empty_and_unknown_file() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");
        touch(&dir, "u1", "a.jpg");

        let err = svc.add(&alice, "a.jpg", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = svc.add(&alice, "ghost.jpg", "x").await.unwrap_err();
        assert!(matches!(err, AppError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_takes_every_case_variant() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");
        touch(&dir, "u1", "a.jpg");

        for tag in ["Beach", "beach", "Sunset"] {
            svc.add(&alice, "a.jpg", tag).await.unwrap();
        }

        assert_eq!(
            svc.remove(&alice, "a.jpg", "BEACH").await.unwrap(),
            TagOutcome::Removed
        );
        assert_eq!(tags_of(&svc, "a.jpg").await, ["Sunset"]);

        assert_eq!(
            svc.remove(&alice, "a.jpg", "beach").await.unwrap(),
            TagOutcome::NotPresent
        );
    }

    #[tokio::test]
    async fn test_rename_preserves_position() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");
        touch(&dir, "u1", "a.jpg");

        for tag in ["first", "Middle", "last"] {
            svc.add(&alice, "a.jpg", tag).await.unwrap();
        }

        let outcome = svc.rename(&alice, "a.jpg", "middle", "Center").await.unwrap();
        assert!(outcome.changed);
        assert_eq!(tags_of(&svc, "a.jpg").await, ["first", "Center", "last"]);

        let outcome = svc.rename(&alice, "a.jpg", "missing", "x").await.unwrap();
        assert!(!outcome.changed);
    }

    #[tokio::test]
    async fn test_rename_global_reports_whether_anything_changed() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");
        touch(&dir, "u1", "a.jpg");
        touch(&dir, "u1", "b.jpg");
        touch(&dir, "u1", "c.jpg");

        svc.add(&alice, "a.jpg", "Holiday").await.unwrap();
        svc.add(&alice, "b.jpg", "holiday").await.unwrap();
        svc.add(&alice, "c.jpg", "Work").await.unwrap();

        let outcome = svc
            .rename_global(&alice, "HOLIDAY", "Vacation")
            .await
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(tags_of(&svc, "a.jpg").await, ["Vacation"]);
        assert_eq!(tags_of(&svc, "b.jpg").await, ["Vacation"]);
        assert_eq!(tags_of(&svc, "c.jpg").await, ["Work"]);

        let outcome = svc
            .rename_global(&alice, "HOLIDAY", "Vacation")
            .await
            .unwrap();
        assert!(!outcome.changed);
    }
}
