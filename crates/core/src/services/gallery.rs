//! Gallery queries: listing a user's media with filtering, and grouping
//! it into albums.
//!
//! The filesystem is the source of truth for which media exists: the query
//! layer lists the owner's directory and joins the metadata documents onto
//! whatever it finds there. Metadata entries for files no longer on disk
//! are simply not surfaced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use galerie_common::{AppError, AppResult, MediaConfig, MediaKind};
use galerie_db::entities::user;

use super::metadata::{MetadataDocs, MetadataStore};

/// How many files an album summary shows as preview thumbnails.
const ALBUM_PREVIEW_LIMIT: usize = 5;

/// Optional gallery filters.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryFilter {
    /// Exact tag membership, matched case-insensitively.
    pub tag: Option<String>,
    /// Case-insensitive substring over filename, description, album title
    /// and tags.
    pub search: Option<String>,
}

/// One media item as presented to a viewer.
#[derive(Debug, Clone, Serialize)]
pub struct MediaEntry {
    pub filename: String,
    pub kind: MediaKind,
    pub description: String,
    pub album: Option<String>,
    pub tags: Vec<String>,
    pub comments: Vec<String>,
    /// Serving path for the original file.
    pub url: String,
    /// Serving path for the preview image. For videos this points at the
    /// cached JPEG; for images it is the file itself.
    pub thumbnail_url: String,
    pub modified_at: DateTime<Utc>,
}

/// One album with its contents summarized.
#[derive(Debug, Clone, Serialize)]
pub struct AlbumSummary {
    pub title: String,
    pub image_count: usize,
    pub video_count: usize,
    /// Newest files in the album, up to the preview limit.
    pub previews: Vec<MediaEntry>,
    /// Is this album in the viewing user's favorites list?
    pub favorited: bool,
}

/// Read-only gallery queries over a user's own directory.
#[derive(Clone)]
pub struct GalleryService {
    store: MetadataStore,
    media: MediaConfig,
}

impl GalleryService {
    #[must_use]
    pub const fn new(store: MetadataStore, media: MediaConfig) -> Self {
        Self { store, media }
    }

    /// List the owner's media, newest first, applying the given filters.
    pub async fn list(
        &self,
        owner: &user::Model,
        filter: &GalleryFilter,
    ) -> AppResult<Vec<MediaEntry>> {
        let docs = self.store.load().await?;
        let mut entries = self.scan(&owner.id, &docs).await?;
        entries.retain(|e| matches_filter(e, filter));
        Ok(entries)
    }

    /// Group the owner's media into album summaries, alphabetically by
    /// title. Albums with no files yet still appear, via their title
    /// self-mapping in the album document.
    pub async fn albums(&self, owner: &user::Model) -> AppResult<Vec<AlbumSummary>> {
        let docs = self.store.load().await?;
        let entries = self.scan(&owner.id, &docs).await?;

        let mut titles: Vec<String> = docs
            .albums()
            .titles()
            .into_iter()
            .map(str::to_string)
            .collect();
        titles.sort();

        let favorites = docs.albums().favorites_for(&owner.id);

        let summaries = titles
            .into_iter()
            .map(|title| {
                let members: Vec<&MediaEntry> = entries
                    .iter()
                    .filter(|e| e.album.as_deref() == Some(title.as_str()))
                    .collect();
                AlbumSummary {
                    image_count: members
                        .iter()
                        .filter(|e| e.kind == MediaKind::Image)
                        .count(),
                    video_count: members
                        .iter()
                        .filter(|e| e.kind == MediaKind::Video)
                        .count(),
                    previews: members
                        .iter()
                        .take(ALBUM_PREVIEW_LIMIT)
                        .map(|e| (*e).clone())
                        .collect(),
                    favorited: favorites.contains(&title),
                    title,
                }
            })
            .collect();

        Ok(summaries)
    }

    /// The owner's files assigned to one album title, newest first.
    /// The title must exist in the album registry.
    pub async fn album(&self, owner: &user::Model, title: &str) -> AppResult<Vec<MediaEntry>> {
        let docs = self.store.load().await?;
        if !docs.albums().titles().contains(&title) {
            return Err(AppError::NotFound(format!("Album {title}")));
        }

        let mut entries = self.scan(&owner.id, &docs).await?;
        entries.retain(|e| e.album.as_deref() == Some(title));
        Ok(entries)
    }

    /// Every tag in use, deduplicated case-insensitively and sorted.
    /// There is no tag registry; this is the union of the per-file lists.
    pub async fn all_tags(&self) -> AppResult<Vec<String>> {
        let docs = self.store.load().await?;

        let mut seen = std::collections::BTreeMap::new();
        for tags in docs.tags().values() {
            for tag in tags {
                seen.entry(tag.to_lowercase()).or_insert_with(|| tag.clone());
            }
        }
        Ok(seen.into_values().collect())
    }

    /// Scan the owner's directory and join metadata onto every
    /// allow-listed file, newest first.
    async fn scan(&self, owner_id: &str, docs: &MetadataDocs) -> AppResult<Vec<MediaEntry>> {
        let dir = self.media.upload_dir.join(owner_id);

        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Internal(format!("{}: {e}", dir.display())));
            }
        };

        let mut entries = Vec::new();
        loop {
            let entry = read_dir
                .next_entry()
                .await
                .map_err(|e| AppError::Internal(format!("{}: {e}", dir.display())))?;
            let Some(entry) = entry else { break };

            let filename = entry.file_name().to_string_lossy().into_owned();
            let Some(kind) = MediaKind::from_filename(&filename) else {
                continue;
            };

            let modified_at = entry
                .metadata()
                .await
                .ok()
                .and_then(|m| m.modified().ok())
                .map_or_else(Utc::now, DateTime::<Utc>::from);

            entries.push(self.build_entry(owner_id, filename, kind, modified_at, docs));
        }

        entries.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });

        Ok(entries)
    }

    fn build_entry(
        &self,
        owner_id: &str,
        filename: String,
        kind: MediaKind,
        modified_at: DateTime<Utc>,
        docs: &MetadataDocs,
    ) -> MediaEntry {
        let url = format!("/api/media/{owner_id}/{filename}");
        let thumbnail_url = match kind {
            MediaKind::Video => {
                let stem = filename.rsplit_once('.').map_or(filename.as_str(), |(s, _)| s);
                format!("/api/thumbnails/{stem}.jpg")
            }
            MediaKind::Image => url.clone(),
        };

        MediaEntry {
            description: docs.description_of(&filename).to_string(),
            album: docs.albums().get(&filename).map(str::to_string),
            tags: docs.tags_of(&filename).to_vec(),
            comments: docs.comments_of(&filename).to_vec(),
            url,
            thumbnail_url,
            modified_at,
            filename,
            kind,
        }
    }
}

fn matches_filter(entry: &MediaEntry, filter: &GalleryFilter) -> bool {
    if let Some(tag) = normalized(&filter.tag) {
        if !entry.tags.iter().any(|t| t.to_lowercase() == tag) {
            return false;
        }
    }

    if let Some(query) = normalized(&filter.search) {
        let hit = entry.filename.to_lowercase().contains(&query)
            || entry.description.to_lowercase().contains(&query)
            || entry
                .album
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains(&query))
            || entry.tags.iter().any(|t| t.to_lowercase().contains(&query));
        if !hit {
            return false;
        }
    }

    true
}

fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}
