//! Fixtures shared by unit tests: a migrated in-memory database plus seeding
//! helpers for users, sessions, tenants and memberships.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::config::AppConfig;
use crate::db::{init_pool, run_migrations};
use crate::models::{TenantRole, session, tenant, tenant_membership, user};

pub(crate) const TEST_SECRET: &str = "test-secret-test-secret-test-secret!";

pub(crate) struct TestDb {
    pub conn: Arc<DatabaseConnection>,
}

pub(crate) async fn setup_test_db() -> TestDb {
    let config = AppConfig {
        profile: "test".to_string(),
        ..Default::default()
    };

    let conn = init_pool(&config).await.expect("Failed to init test DB");
    run_migrations(&conn).await.expect("Failed to run migrations");
    TestDb {
        conn: Arc::new(conn),
    }
}

impl TestDb {
    pub async fn seed_user(&self, id: &str) -> user::Model {
        let now = Utc::now().fixed_offset();
        user::ActiveModel {
            id: Set(id.to_string()),
            name: Set(format!("User {id}")),
            email: Set(format!("{id}@example.com")),
            email_verified: Set(true),
            image: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.conn)
        .await
        .expect("Failed to seed user")
    }

    pub async fn seed_session(
        &self,
        id: &str,
        token: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> session::Model {
        let now = Utc::now().fixed_offset();
        session::ActiveModel {
            id: Set(id.to_string()),
            token: Set(token.to_string()),
            user_id: Set(user_id.to_string()),
            expires_at: Set(expires_at.fixed_offset()),
            ip_address: Set(None),
            user_agent: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.conn)
        .await
        .expect("Failed to seed session")
    }

    pub async fn seed_tenant(&self, id: &str, slug: &str) -> tenant::Model {
        let now = Utc::now().fixed_offset();
        tenant::ActiveModel {
            id: Set(id.to_string()),
            slug: Set(slug.to_string()),
            name: Set(format!("Tenant {slug}")),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.conn)
        .await
        .expect("Failed to seed tenant")
    }

    pub async fn seed_membership(
        &self,
        tenant_id: &str,
        user_id: &str,
        role: TenantRole,
    ) -> tenant_membership::Model {
        let now = Utc::now().fixed_offset();
        tenant_membership::ActiveModel {
            id: Set(format!("{tenant_id}:{user_id}")),
            tenant_id: Set(tenant_id.to_string()),
            user_id: Set(user_id.to_string()),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.conn)
        .await
        .expect("Failed to seed membership")
    }
}
