//! # Session Repository
//!
//! Looks up live sessions written by the external auth service.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;

use crate::error::RepositoryError;
use crate::models::{Session, User, session, user};

/// Repository for session database operations
#[derive(Debug, Clone)]
pub struct SessionRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Finds the session for `token` together with its user.
    ///
    /// Sessions expiring at or before `now` are treated as absent, as are
    /// sessions whose user row is gone.
    pub async fn find_active_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(session::Model, user::Model)>, RepositoryError> {
        let row = Session::find()
            .filter(session::Column::Token.eq(token))
            .filter(session::Column::ExpiresAt.gt(now))
            .find_also_related(User)
            .one(&*self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(row.and_then(|(session, user)| user.map(|user| (session, user))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_test_db;
    use chrono::Duration;

    #[tokio::test]
    async fn live_session_is_found_with_user() {
        let db = setup_test_db().await;
        db.seed_user("u1").await;
        db.seed_session("s1", "tok-live", "u1", Utc::now() + Duration::hours(1))
            .await;

        let repo = SessionRepository::new(db.conn.clone());
        let (session, user) = repo
            .find_active_by_token("tok-live", Utc::now())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.id, "s1");
        assert_eq!(user.id, "u1");
    }

    #[tokio::test]
    async fn expired_session_is_absent() {
        let db = setup_test_db().await;
        db.seed_user("u1").await;
        db.seed_session("s1", "tok-old", "u1", Utc::now() - Duration::minutes(1))
            .await;

        let repo = SessionRepository::new(db.conn.clone());
        let found = repo.find_active_by_token("tok-old", Utc::now()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn unknown_token_is_absent() {
        let db = setup_test_db().await;
        let repo = SessionRepository::new(db.conn.clone());
        let found = repo.find_active_by_token("nope", Utc::now()).await.unwrap();
        assert!(found.is_none());
    }
}
