//! Metadata store: the four JSON side-documents.
//!
//! Every media item is described by up to four facets, each living in its
//! own flat JSON document under the data directory:
//!
//! - `descriptions.json` — filename to description string
//! - `albums.json` — filename to album title, plus title-to-title
//!   self-mappings for albums with no files yet, plus the per-user
//!   favorites map under the reserved `"favorites"` key
//! - `comments.json` — filename to ordered comment list
//! - `tags.json` — filename to tag list (case-preserving)
//!
//! The on-disk layout is flat JSON objects with 2-space indentation,
//! compatible with pre-existing data. In memory the favorites map is a
//! separate typed field of [`AlbumDocument`]; only the (de)serializer knows
//! about the reserved key.
//!
//! All mutations go through [`MetadataStore::update`], which holds a
//! store-wide mutex across the load, the mutation closure and the rewrite of
//! every touched document. Concurrent read-modify-write cycles are thereby
//! serialized instead of losing updates. Documents are rewritten through a
//! temp file followed by a rename, so a crash never leaves a half-written
//! document behind.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::{self, DeserializeOwned};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use galerie_common::{AppError, AppResult};

const DESCRIPTIONS_FILE: &str = "descriptions.json";
const ALBUMS_FILE: &str = "albums.json";
const COMMENTS_FILE: &str = "comments.json";
const TAGS_FILE: &str = "tags.json";

/// Reserved key inside `albums.json` holding the favorites map.
const FAVORITES_KEY: &str = "favorites";

/// The album document: filename-to-title assignments and title
/// self-mappings in one key space, favorites split out as a typed field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumDocument {
    entries: BTreeMap<String, String>,
    favorites: BTreeMap<String, Vec<String>>,
}

impl AlbumDocument {
    /// Album title assigned to a key (a filename, or a title mapped to
    /// itself).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Assign a key to an album title.
    pub fn assign(&mut self, key: &str, title: &str) {
        self.entries.insert(key.to_string(), title.to_string());
    }

    /// Remove a key's assignment, returning the previous title.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Every distinct album title (the value set of the registry).
    #[must_use]
    pub fn titles(&self) -> BTreeSet<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    /// Is the reserved favorites key, which can never be an album title?
    #[must_use]
    pub fn is_reserved_title(title: &str) -> bool {
        title == FAVORITES_KEY
    }

    /// Favorite album titles for a user.
    #[must_use]
    pub fn favorites_for(&self, user_id: &str) -> &[String] {
        self.favorites.get(user_id).map_or(&[], Vec::as_slice)
    }

    /// Mutable favorites list for a user, created on first use.
    pub fn favorites_for_mut(&mut self, user_id: &str) -> &mut Vec<String> {
        self.favorites.entry(user_id.to_string()).or_default()
    }
}

impl Serialize for AlbumDocument {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(!self.favorites.is_empty());
        let mut map = serializer.serialize_map(Some(self.entries.len() + extra))?;
        for (key, title) in &self.entries {
            map.serialize_entry(key, title)?;
        }
        if !self.favorites.is_empty() {
            map.serialize_entry(FAVORITES_KEY, &self.favorites)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AlbumDocument {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;

        let favorites = match raw.remove(FAVORITES_KEY) {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| de::Error::custom(format!("favorites map: {e}")))?,
            None => BTreeMap::new(),
        };

        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            let title = value
                .as_str()
                .ok_or_else(|| de::Error::custom(format!("album entry `{key}` is not a string")))?
                .to_string();
            entries.insert(key, title);
        }

        Ok(Self { entries, favorites })
    }
}

/// Which documents an update has touched.
#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    descriptions: bool,
    albums: bool,
    comments: bool,
    tags: bool,
}

/// In-memory snapshot of all four documents, with dirty tracking.
///
/// Read accessors borrow; `_mut` accessors mark the document dirty, and only
/// dirty documents are rewritten when the update commits. Callers should
/// read first and reach for `_mut` only when actually changing something, so
/// no-op operations leave the files byte-identical.
#[derive(Debug, Clone, Default)]
pub struct MetadataDocs {
    descriptions: BTreeMap<String, String>,
    albums: AlbumDocument,
    comments: BTreeMap<String, Vec<String>>,
    tags: BTreeMap<String, Vec<String>>,
    dirty: Dirty,
}

impl MetadataDocs {
    /// Description map.
    #[must_use]
    pub const fn descriptions(&self) -> &BTreeMap<String, String> {
        &self.descriptions
    }

    /// Mutable description map.
    pub fn descriptions_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.dirty.descriptions = true;
        &mut self.descriptions
    }

    /// Album document.
    #[must_use]
    pub const fn albums(&self) -> &AlbumDocument {
        &self.albums
    }

    /// Mutable album document.
    pub fn albums_mut(&mut self) -> &mut AlbumDocument {
        self.dirty.albums = true;
        &mut self.albums
    }

    /// Comment map.
    #[must_use]
    pub const fn comments(&self) -> &BTreeMap<String, Vec<String>> {
        &self.comments
    }

    /// Mutable comment map.
    pub fn comments_mut(&mut self) -> &mut BTreeMap<String, Vec<String>> {
        self.dirty.comments = true;
        &mut self.comments
    }

    /// Tag map.
    #[must_use]
    pub const fn tags(&self) -> &BTreeMap<String, Vec<String>> {
        &self.tags
    }

    /// Mutable tag map.
    pub fn tags_mut(&mut self) -> &mut BTreeMap<String, Vec<String>> {
        self.dirty.tags = true;
        &mut self.tags
    }

    /// Description for a filename, empty if none.
    #[must_use]
    pub fn description_of(&self, filename: &str) -> &str {
        self.descriptions.get(filename).map_or("", String::as_str)
    }

    /// Comments for a filename.
    #[must_use]
    pub fn comments_of(&self, filename: &str) -> &[String] {
        self.comments.get(filename).map_or(&[], Vec::as_slice)
    }

    /// Tags for a filename.
    #[must_use]
    pub fn tags_of(&self, filename: &str) -> &[String] {
        self.tags.get(filename).map_or(&[], Vec::as_slice)
    }

    /// Register a freshly uploaded file in all four documents: optional
    /// album assignment, empty description, comment list seeded with the
    /// upload marker, empty tag list.
    pub fn register_upload(&mut self, filename: &str, album: Option<&str>, alias: &str) {
        if let Some(title) = album {
            self.albums_mut().assign(filename, title);
        }
        self.descriptions_mut()
            .entry(filename.to_string())
            .or_default();
        self.tags_mut().entry(filename.to_string()).or_default();
        self.comments_mut()
            .entry(filename.to_string())
            .or_default()
            .insert(0, format!("Uploaded by {alias}"));
    }

    /// Drop every entry for a filename. Touches only the documents that
    /// actually held one.
    pub fn remove_file(&mut self, filename: &str) {
        if self.descriptions.contains_key(filename) {
            self.descriptions_mut().remove(filename);
        }
        if self.albums.get(filename).is_some() {
            self.albums_mut().remove(filename);
        }
        if self.comments.contains_key(filename) {
            self.comments_mut().remove(filename);
        }
        if self.tags.contains_key(filename) {
            self.tags_mut().remove(filename);
        }
    }
}

/// Store for the four JSON documents.
#[derive(Clone)]
pub struct MetadataStore {
    data_dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl MetadataStore {
    /// Create a store rooted at the given data directory.
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read-only snapshot of all four documents.
    ///
    /// A missing document yields its empty form; a document that exists but
    /// cannot be parsed is a hard error, never a silent reset.
    pub async fn load(&self) -> AppResult<MetadataDocs> {
        Ok(MetadataDocs {
            descriptions: self.load_document(DESCRIPTIONS_FILE).await?,
            albums: self.load_document(ALBUMS_FILE).await?,
            comments: self.load_document(COMMENTS_FILE).await?,
            tags: self.load_document(TAGS_FILE).await?,
            dirty: Dirty::default(),
        })
    }

    /// Run a mutation under the store-wide lock and persist every touched
    /// document. An error from the closure aborts without writing anything.
    pub async fn update<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut MetadataDocs) -> AppResult<T>,
    {
        let _guard = self.lock.lock().await;

        let mut docs = self.load().await?;
        let result = f(&mut docs)?;

        if docs.dirty.descriptions {
            self.save_document(DESCRIPTIONS_FILE, &docs.descriptions)
                .await?;
        }
        if docs.dirty.albums {
            self.save_document(ALBUMS_FILE, &docs.albums).await?;
        }
        if docs.dirty.comments {
            self.save_document(COMMENTS_FILE, &docs.comments).await?;
        }
        if docs.dirty.tags {
            self.save_document(TAGS_FILE, &docs.tags).await?;
        }

        Ok(result)
    }

    async fn load_document<T>(&self, name: &str) -> AppResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.data_dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| AppError::Metadata(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(AppError::Metadata(format!("{}: {e}", path.display()))),
        }
    }

    async fn save_document<T: Serialize>(&self, name: &str, value: &T) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| internal_io(&self.data_dir, &e))?;

        let path = self.data_dir.join(name);
        let tmp = self.data_dir.join(format!("{name}.tmp"));

        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| AppError::Internal(format!("serialize {name}: {e}")))?;

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| internal_io(&tmp, &e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| internal_io(&path, &e))?;

        Ok(())
    }
}

fn internal_io(path: &Path, e: &std::io::Error) -> AppError {
    AppError::Internal(format!("{}: {e}", path.display()))
}
