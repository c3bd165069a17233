//! Tenant entity model
//!
//! This module contains the SeaORM entity model for the tenant table. Tenants
//! are provisioned elsewhere; this service only reads them.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Tenant entity representing an organization account
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenant")]
pub struct Model {
    /// Unique identifier for the tenant (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Unique, lower-case, URL-safe handle
    #[sea_orm(unique)]
    pub slug: String,

    /// Display name for the tenant
    pub name: String,

    /// Timestamp when the tenant was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the tenant was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tenant_membership::Entity")]
    TenantMembership,
}

impl Related<super::tenant_membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenantMembership.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
