//! Album mutations: creation and favorite toggling.

use serde::Serialize;

use galerie_common::{AppError, AppResult};
use galerie_db::entities::user;

use super::metadata::{AlbumDocument, MetadataStore};

/// Maximum length of an album title, in characters.
const MAX_TITLE_LEN: usize = 50;

/// Result of a favorite toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteAction {
    Favorited,
    Unfavorited,
}

/// Service for album mutations.
#[derive(Clone)]
pub struct AlbumService {
    store: MetadataStore,
}

impl AlbumService {
    #[must_use]
    pub const fn new(store: MetadataStore) -> Self {
        Self { store }
    }

    /// Create an empty album, registered as a title self-mapping in the
    /// album document. Returns the normalized title.
    pub async fn create(&self, _owner: &user::Model, title: &str) -> AppResult<String> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Album title cannot be empty".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(AppError::Validation(format!(
                "Album title exceeds {MAX_TITLE_LEN} characters"
            )));
        }
        if AlbumDocument::is_reserved_title(&title) {
            return Err(AppError::Validation("Album title is reserved".to_string()));
        }

        self.store
            .update(move |docs| {
                // Duplicates are checked by value: an album also exists when
                // it only appears as a per-file assignment.
                if docs.albums().titles().contains(title.as_str()) {
                    return Err(AppError::Conflict("Album already exists".to_string()));
                }
                docs.albums_mut().assign(&title, &title);
                Ok(title)
            })
            .await
    }

    /// Flip an album's membership in the user's favorites list.
    pub async fn toggle_favorite(
        &self,
        user: &user::Model,
        title: &str,
    ) -> AppResult<FavoriteAction> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Album title cannot be empty".to_string()));
        }

        let user_id = user.id.clone();
        self.store
            .update(move |docs| {
                if !docs.albums().titles().contains(title.as_str()) {
                    return Err(AppError::NotFound(format!("Album {title}")));
                }

                let favorites = docs.albums_mut().favorites_for_mut(&user_id);
                if let Some(pos) = favorites.iter().position(|t| *t == title) {
                    favorites.remove(pos);
                    Ok(FavoriteAction::Unfavorited)
                } else {
                    favorites.push(title);
                    Ok(FavoriteAction::Favorited)
                }
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::metadata::MetadataStore;
    use super::super::testing;
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> AlbumService {
        AlbumService::new(MetadataStore::new(dir.path().to_path_buf()))
    }

    #[tokio::test]
    async fn test_create_registers_a_self_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");

        let title = svc.create(&alice, "  Summer 2026 ").await.unwrap();
        assert_eq!(title, "Summer 2026");

        let docs = svc.store.load().await.unwrap();
        assert_eq!(docs.albums().get("Summer 2026"), Some("Summer 2026"));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");

        for bad in ["", "   ", &"x".repeat(51), "favorites"] {
            let err = svc.create(&alice, bad).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{bad:?}");
        }

        // Exactly at the limit is fine
        svc.create(&alice, &"x".repeat(50)).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_by_value() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");

        // "Trip" exists only as a per-file assignment, not as a key
        svc.store
            .update(|docs| {
                docs.albums_mut().assign("a.jpg", "Trip");
                Ok(())
            })
            .await
            .unwrap();

        let err = svc.create(&alice, "Trip").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_toggle_favorite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");

        svc.create(&alice, "Trip").await.unwrap();

        assert_eq!(
            svc.toggle_favorite(&alice, "Trip").await.unwrap(),
            FavoriteAction::Favorited
        );
        let docs = svc.store.load().await.unwrap();
        assert_eq!(docs.albums().favorites_for("u1"), ["Trip"]);

        assert_eq!(
            svc.toggle_favorite(&alice, "Trip").await.unwrap(),
            FavoriteAction::Unfavorited
        );
        let docs = svc.store.load().await.unwrap();
        assert!(docs.albums().favorites_for("u1").is_empty());
    }

    #[tokio::test]
    async fn test_toggle_favorite_requires_an_existing_album() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        let alice = testing::user("u1", "alice");

        let err = svc.toggle_favorite(&alice, "Nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
