//! Database migrations for the ShipStack API.
//!
//! The `user` and `session` tables mirror the layout written by the external
//! auth provider; `tenant` and `tenant_membership` back tenant resolution.

pub use sea_orm_migration::prelude::*;

mod m2025_01_01_000001_create_users;
mod m2025_01_01_000002_create_sessions;
mod m2025_01_01_000003_create_tenants;
mod m2025_01_01_000004_create_tenant_memberships;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_01_000001_create_users::Migration),
            Box::new(m2025_01_01_000002_create_sessions::Migration),
            Box::new(m2025_01_01_000003_create_tenants::Migration),
            Box::new(m2025_01_01_000004_create_tenant_memberships::Migration),
        ]
    }
}
