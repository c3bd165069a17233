//! Test utilities for database-backed API tests.
//!
//! Sets up an in-memory SQLite database with migrations and seeds the users,
//! sessions, tenants and memberships the API tests rely on.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use shipstack::config::AppConfig;
use shipstack::models::{TenantRole, session, tenant, tenant_membership, user};
use shipstack::session::SessionTokenReader;

#[allow(dead_code)]
pub const TEST_SECRET: &str = "integration-secret-integration-secret";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let config = AppConfig {
        profile: "test".to_string(),
        ..Default::default()
    };
    let db = shipstack::db::init_pool(&config).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Configuration accepted by `AppState::new`.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        auth_secret: Some(TEST_SECRET.to_string()),
        ..Default::default()
    }
}

/// Signs a raw session token with the test secret.
#[allow(dead_code)]
pub fn signed(token: &str) -> String {
    SessionTokenReader::new(TEST_SECRET.as_bytes(), "better-auth")
        .expect("test secret is long enough")
        .sign(token)
}

#[allow(dead_code)]
pub async fn insert_user(db: &DatabaseConnection, id: &str) -> Result<user::Model> {
    let now = Utc::now().fixed_offset();
    let model = user::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("User {id}")),
        email: Set(format!("{id}@example.com")),
        email_verified: Set(true),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(model)
}

#[allow(dead_code)]
pub async fn insert_session(
    db: &DatabaseConnection,
    token: &str,
    user_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<session::Model> {
    let now = Utc::now().fixed_offset();
    let model = session::ActiveModel {
        id: Set(format!("session-{token}")),
        token: Set(token.to_string()),
        user_id: Set(user_id.to_string()),
        expires_at: Set(expires_at.fixed_offset()),
        ip_address: Set(Some("127.0.0.1".to_string())),
        user_agent: Set(Some("test-agent".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(model)
}

#[allow(dead_code)]
pub async fn insert_tenant(db: &DatabaseConnection, id: &str, slug: &str) -> Result<tenant::Model> {
    let now = Utc::now().fixed_offset();
    let model = tenant::ActiveModel {
        id: Set(id.to_string()),
        slug: Set(slug.to_string()),
        name: Set(format!("Tenant {slug}")),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(model)
}

#[allow(dead_code)]
pub async fn insert_membership(
    db: &DatabaseConnection,
    tenant_id: &str,
    user_id: &str,
    role: TenantRole,
) -> Result<tenant_membership::Model> {
    let now = Utc::now().fixed_offset();
    let model = tenant_membership::ActiveModel {
        id: Set(format!("{tenant_id}-{user_id}")),
        tenant_id: Set(tenant_id.to_string()),
        user_id: Set(user_id.to_string()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(model)
}

/// Seeds tenant `t1` (slug `acme`) with `u1` as admin, plus `u2` with no
/// membership, `u3` with an expired session, and live sessions `tok-u1` and
/// `tok-u2`.
#[allow(dead_code)]
pub async fn seed_fixtures(db: &DatabaseConnection) -> Result<()> {
    insert_tenant(db, "t1", "acme").await?;
    insert_tenant(db, "t2", "beta").await?;
    for id in ["u1", "u2", "u3"] {
        insert_user(db, id).await?;
    }
    insert_membership(db, "t1", "u1", TenantRole::Admin).await?;
    insert_membership(db, "t2", "u2", TenantRole::Member).await?;

    let tomorrow = Utc::now() + Duration::days(1);
    insert_session(db, "tok-u1", "u1", tomorrow).await?;
    insert_session(db, "tok-u2", "u2", tomorrow).await?;
    insert_session(db, "tok-u3", "u3", Utc::now() - Duration::minutes(5)).await?;
    Ok(())
}
