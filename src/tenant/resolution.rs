//! Turns an extracted identifier and an optional user into the tenant and
//! membership attached to the request context.

use std::sync::Arc;

use metrics::counter;

use super::TenantIdentifier;
use crate::error::RepositoryError;
use crate::models::{tenant, tenant_membership};
use crate::repositories::TenantDirectory;

/// Tenant and membership found for a request. Either may be absent.
///
/// A membership is only ever present alongside its tenant, and always belongs
/// to the requesting user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenantResolution {
    pub tenant: Option<tenant::Model>,
    pub membership: Option<tenant_membership::Model>,
}

#[derive(Clone)]
pub struct TenantResolver {
    directory: Arc<dyn TenantDirectory>,
}

impl TenantResolver {
    pub fn new(directory: Arc<dyn TenantDirectory>) -> Self {
        Self { directory }
    }

    /// Resolves the tenant an identifier names and, for a signed-in user, their
    /// membership in it.
    ///
    /// Unknown tenants and missing memberships yield an empty resolution rather
    /// than an error; only storage failures propagate.
    pub async fn resolve(
        &self,
        identifier: Option<&TenantIdentifier>,
        user_id: Option<&str>,
    ) -> Result<TenantResolution, RepositoryError> {
        let Some(identifier) = identifier else {
            record("none");
            return Ok(TenantResolution::default());
        };

        let Some(tenant) = self.directory.find_tenant(identifier).await? else {
            tracing::debug!(
                kind = identifier.kind(),
                identifier = identifier.as_str(),
                "Tenant not found"
            );
            record("unknown");
            return Ok(TenantResolution::default());
        };

        let Some(user_id) = user_id else {
            record("anonymous");
            return Ok(TenantResolution {
                tenant: Some(tenant),
                membership: None,
            });
        };

        let membership = self.directory.find_membership(&tenant.id, user_id).await?;
        record(if membership.is_some() {
            "member"
        } else {
            "non_member"
        });

        tracing::debug!(
            tenant_id = %tenant.id,
            user_id,
            role = membership.as_ref().map(|m| m.role.as_str()),
            "Tenant resolved"
        );

        Ok(TenantResolution {
            tenant: Some(tenant),
            membership,
        })
    }
}

fn record(outcome: &'static str) {
    counter!("tenant_resolution_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TenantRole;
    use crate::repositories::TenantRepository;
    use crate::test_support::{TestDb, setup_test_db};
    use async_trait::async_trait;

    async fn resolver() -> (TestDb, TenantResolver) {
        let db = setup_test_db().await;
        db.seed_tenant("t1", "acme").await;
        db.seed_user("u1").await;
        db.seed_user("u2").await;
        db.seed_membership("t1", "u1", TenantRole::Admin).await;
        let resolver = TenantResolver::new(Arc::new(TenantRepository::new(db.conn.clone())));
        (db, resolver)
    }

    #[tokio::test]
    async fn member_gets_tenant_and_membership() {
        let (_db, resolver) = resolver().await;

        let resolution = resolver
            .resolve(Some(&TenantIdentifier::Slug("acme".into())), Some("u1"))
            .await
            .unwrap();

        assert_eq!(resolution.tenant.unwrap().id, "t1");
        let membership = resolution.membership.unwrap();
        assert_eq!(membership.user_id, "u1");
        assert_eq!(membership.role, TenantRole::Admin);
    }

    #[tokio::test]
    async fn non_member_gets_tenant_only() {
        let (_db, resolver) = resolver().await;

        let resolution = resolver
            .resolve(Some(&TenantIdentifier::Id("t1".into())), Some("u2"))
            .await
            .unwrap();

        assert_eq!(resolution.tenant.unwrap().id, "t1");
        assert!(resolution.membership.is_none());
    }

    #[tokio::test]
    async fn anonymous_gets_tenant_only() {
        let (_db, resolver) = resolver().await;

        let resolution = resolver
            .resolve(Some(&TenantIdentifier::Slug("acme".into())), None)
            .await
            .unwrap();

        assert!(resolution.tenant.is_some());
        assert!(resolution.membership.is_none());
    }

    #[tokio::test]
    async fn unknown_or_missing_identifier_is_empty() {
        let (_db, resolver) = resolver().await;

        let unknown = resolver
            .resolve(Some(&TenantIdentifier::Slug("ghost".into())), Some("u1"))
            .await
            .unwrap();
        assert_eq!(unknown, TenantResolution::default());

        let missing = resolver.resolve(None, Some("u1")).await.unwrap();
        assert_eq!(missing, TenantResolution::default());
    }

    struct FailingDirectory;

    #[async_trait]
    impl TenantDirectory for FailingDirectory {
        async fn find_tenant(
            &self,
            _identifier: &TenantIdentifier,
        ) -> Result<Option<tenant::Model>, RepositoryError> {
            Err(sea_orm::DbErr::Custom("boom".into()).into())
        }

        async fn find_membership(
            &self,
            _tenant_id: &str,
            _user_id: &str,
        ) -> Result<Option<tenant_membership::Model>, RepositoryError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let resolver = TenantResolver::new(Arc::new(FailingDirectory));
        let result = resolver
            .resolve(Some(&TenantIdentifier::Slug("acme".into())), None)
            .await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }
}
