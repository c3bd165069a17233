//! Migration to create the tenant_membership join table.
//!
//! One row per (tenant, user) pair; rows cascade away with either side.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TenantMembership::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenantMembership::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TenantMembership::TenantId).text().not_null())
                    .col(ColumnDef::new(TenantMembership::UserId).text().not_null())
                    .col(
                        ColumnDef::new(TenantMembership::Role)
                            .text()
                            .not_null()
                            .default("member")
                            .check(
                                Expr::col(TenantMembership::Role)
                                    .is_in(["owner", "admin", "member"]),
                            ),
                    )
                    .col(
                        ColumnDef::new(TenantMembership::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TenantMembership::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_membership_tenant_id")
                            .from(TenantMembership::Table, TenantMembership::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_membership_user_id")
                            .from(TenantMembership::Table, TenantMembership::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("tenant_membership_tenant_id_user_id_idx")
                    .table(TenantMembership::Table)
                    .col(TenantMembership::TenantId)
                    .col(TenantMembership::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("tenant_membership_tenant_id_user_id_idx")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TenantMembership::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenantMembership {
    Table,
    Id,
    TenantId,
    UserId,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenant {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
