//! Access grants: delegating upload/comment rights to another user.

use chrono::Utc;
use sea_orm::Set;
use tracing::info;

use galerie_common::{AppError, AppResult, IdGenerator};
use galerie_db::entities::shared_access;
use galerie_db::entities::user;
use galerie_db::repositories::{SharedAccessRepository, UserRepository};

/// Service for managing access grants.
#[derive(Clone)]
pub struct ShareService {
    user_repo: UserRepository,
    share_repo: SharedAccessRepository,
    id_gen: IdGenerator,
}

impl ShareService {
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        share_repo: SharedAccessRepository,
        id_gen: IdGenerator,
    ) -> Self {
        Self {
            user_repo,
            share_repo,
            id_gen,
        }
    }

    /// Grant another user access to the actor's gallery, with upload and
    /// comment rights and an alias defaulting to the grantee's username.
    ///
    /// The duplicate pre-check is backed by a unique index on the
    /// (owner, grantee) pair, so two racing requests cannot both insert;
    /// the loser gets the same conflict error the pre-check produces.
    pub async fn share(
        &self,
        actor: &user::Model,
        username: &str,
        alias: Option<String>,
    ) -> AppResult<shared_access::Model> {
        let target = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        if target.id == actor.id {
            return Err(AppError::Validation(
                "Cannot share a gallery with yourself".to_string(),
            ));
        }

        if self
            .share_repo
            .find_by_pair(&actor.id, &target.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Access already granted".to_string()));
        }

        let alias = alias
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| target.username.clone());

        let grant = self
            .share_repo
            .create(shared_access::ActiveModel {
                id: Set(self.id_gen.generate()),
                owner_id: Set(actor.id.clone()),
                grantee_id: Set(target.id.clone()),
                alias: Set(alias),
                can_upload: Set(true),
                can_comment: Set(true),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        info!(owner_id = %actor.id, grantee_id = %target.id, "gallery shared");
        Ok(grant)
    }

    /// Grants the actor has handed out.
    pub async fn given(&self, actor: &user::Model) -> AppResult<Vec<shared_access::Model>> {
        self.share_repo.find_by_owner(&actor.id).await
    }

    /// Grants the actor has received.
    pub async fn received(&self, actor: &user::Model) -> AppResult<Vec<shared_access::Model>> {
        self.share_repo.find_by_grantee(&actor.id).await
    }

    /// Revoke a grant the actor handed out.
    pub async fn revoke(&self, actor: &user::Model, grant_id: &str) -> AppResult<()> {
        let grant = self
            .share_repo
            .find_by_id(grant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Grant {grant_id}")))?;

        if grant.owner_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the gallery owner can revoke a grant".to_string(),
            ));
        }

        self.share_repo.delete(grant_id).await?;
        info!(owner_id = %actor.id, grant_id, "grant revoked");
        Ok(())
    }
}
