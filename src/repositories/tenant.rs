//! # Tenant Repository
//!
//! Read-only lookups behind tenant resolution: tenants by ID or slug and the
//! membership joining a user to a tenant.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;

use crate::error::RepositoryError;
use crate::models::{Tenant, TenantMembership, tenant, tenant_membership};
use crate::tenant::TenantIdentifier;

/// Lookup seam used by [`crate::tenant::TenantResolver`].
///
/// Absent rows are `Ok(None)`; only storage failures are errors.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Finds the tenant an identifier refers to.
    async fn find_tenant(
        &self,
        identifier: &TenantIdentifier,
    ) -> Result<Option<tenant::Model>, RepositoryError>;

    /// Finds the membership row for a (tenant, user) pair.
    async fn find_membership(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Option<tenant_membership::Model>, RepositoryError>;
}

/// SeaORM-backed [`TenantDirectory`]
#[derive(Debug, Clone)]
pub struct TenantRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl TenantRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get tenant by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<tenant::Model>, RepositoryError> {
        Tenant::find_by_id(id.to_string())
            .one(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get tenant by its unique slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<tenant::Model>, RepositoryError> {
        Tenant::find()
            .filter(tenant::Column::Slug.eq(slug))
            .one(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

#[async_trait]
impl TenantDirectory for TenantRepository {
    async fn find_tenant(
        &self,
        identifier: &TenantIdentifier,
    ) -> Result<Option<tenant::Model>, RepositoryError> {
        match identifier {
            TenantIdentifier::Id(id) => self.find_by_id(id).await,
            TenantIdentifier::Slug(slug) => self.find_by_slug(slug).await,
        }
    }

    async fn find_membership(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Option<tenant_membership::Model>, RepositoryError> {
        TenantMembership::find()
            .filter(tenant_membership::Column::TenantId.eq(tenant_id))
            .filter(tenant_membership::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
