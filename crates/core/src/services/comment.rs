//! Comments on media items.
//!
//! A comment is stored as one formatted line, "{alias} — {text}", appended
//! to the file's comment list. The list's first entry is usually the
//! synthetic upload marker seeded by the upload batch.

use galerie_common::{AppError, AppResult, MediaConfig};
use galerie_db::entities::user;
use galerie_db::repositories::SharedAccessRepository;

use super::media::{ensure_media_exists, validate_filename};
use super::metadata::MetadataStore;

/// Service for adding comments.
#[derive(Clone)]
pub struct CommentService {
    share_repo: SharedAccessRepository,
    store: MetadataStore,
    media: MediaConfig,
}

impl CommentService {
    #[must_use]
    pub const fn new(
        share_repo: SharedAccessRepository,
        store: MetadataStore,
        media: MediaConfig,
    ) -> Self {
        Self {
            share_repo,
            store,
            media,
        }
    }

    /// Add a comment to a file in `owner_id`'s gallery. Commenting on
    /// someone else's media requires a grant with `can_comment` set; the
    /// grant's alias is used as the display name. Returns the stored line.
    pub async fn add(
        &self,
        actor: &user::Model,
        owner_id: &str,
        filename: &str,
        text: &str,
    ) -> AppResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        validate_filename(filename)?;

        let alias = self.commenter_alias(actor, owner_id).await?;
        ensure_media_exists(&self.media, owner_id, filename).await?;

        let line = format!("{alias} — {text}");
        let stored = line.clone();
        self.store
            .update(move |docs| {
                docs.comments_mut()
                    .entry(filename.to_string())
                    .or_default()
                    .push(line);
                Ok(())
            })
            .await?;

        Ok(stored)
    }

    async fn commenter_alias(&self, actor: &user::Model, owner_id: &str) -> AppResult<String> {
        if actor.id == owner_id {
            return Ok(actor.username.clone());
        }

        let grant = self
            .share_repo
            .find_by_pair(owner_id, &actor.id)
            .await?
            .ok_or_else(|| AppError::Forbidden("No access to this gallery".to_string()))?;

        if !grant.can_comment {
            return Err(AppError::Forbidden(
                "Comments are not permitted for this gallery".to_string(),
            ));
        }

        Ok(grant.alias)
    }
}
