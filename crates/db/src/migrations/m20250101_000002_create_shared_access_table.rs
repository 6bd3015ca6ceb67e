//! Create `shared_access` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SharedAccess::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SharedAccess::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SharedAccess::OwnerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SharedAccess::GranteeId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SharedAccess::Alias).string_len(80).not_null())
                    .col(
                        ColumnDef::new(SharedAccess::CanUpload)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SharedAccess::CanComment)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SharedAccess::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shared_access_owner")
                            .from(SharedAccess::Table, SharedAccess::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shared_access_grantee")
                            .from(SharedAccess::Table, SharedAccess::GranteeId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (owner_id, grantee_id). Concurrent duplicate share
        // requests both pass an application-level existence check; the index
        // makes the second insert fail instead of creating a second grant.
        manager
            .create_index(
                Index::create()
                    .name("idx_shared_access_owner_grantee")
                    .table(SharedAccess::Table)
                    .col(SharedAccess::OwnerId)
                    .col(SharedAccess::GranteeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: grantee_id (for listing galleries shared to a user)
        manager
            .create_index(
                Index::create()
                    .name("idx_shared_access_grantee_id")
                    .table(SharedAccess::Table)
                    .col(SharedAccess::GranteeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SharedAccess::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SharedAccess {
    Table,
    Id,
    OwnerId,
    GranteeId,
    Alias,
    CanUpload,
    CanComment,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
