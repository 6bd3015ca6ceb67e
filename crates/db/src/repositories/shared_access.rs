//! Shared access repository.

use std::sync::Arc;

use crate::entities::{shared_access, SharedAccess};
use galerie_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};

/// Shared access repository for database operations.
#[derive(Clone)]
pub struct SharedAccessRepository {
    db: Arc<DatabaseConnection>,
}

impl SharedAccessRepository {
    /// Create a new shared access repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a grant by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<shared_access::Model>> {
        SharedAccess::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the grant from an owner to a grantee, if any.
    pub async fn find_by_pair(
        &self,
        owner_id: &str,
        grantee_id: &str,
    ) -> AppResult<Option<shared_access::Model>> {
        SharedAccess::find()
            .filter(shared_access::Column::OwnerId.eq(owner_id))
            .filter(shared_access::Column::GranteeId.eq(grantee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Grants handed out by an owner.
    pub async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<shared_access::Model>> {
        SharedAccess::find()
            .filter(shared_access::Column::OwnerId.eq(owner_id))
            .order_by_asc(shared_access::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Grants received by a grantee (galleries shared to them).
    pub async fn find_by_grantee(&self, grantee_id: &str) -> AppResult<Vec<shared_access::Model>> {
        SharedAccess::find()
            .filter(shared_access::Column::GranteeId.eq(grantee_id))
            .order_by_asc(shared_access::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new grant.
    ///
    /// The (owner, grantee) pair carries a unique index, so a concurrent
    /// duplicate insert surfaces as a database error rather than a second
    /// row; callers map that to a conflict.
    pub async fn create(
        &self,
        model: shared_access::ActiveModel,
    ) -> AppResult<shared_access::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("unique") || msg.contains("duplicate") {
                AppError::Conflict("Access already granted".to_string())
            } else {
                AppError::Database(msg)
            }
        })
    }

    /// Delete a grant.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let grant = self.find_by_id(id).await?;
        if let Some(g) = grant {
            g.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}
