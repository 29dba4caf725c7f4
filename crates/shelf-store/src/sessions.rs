//! Server-side login sessions.

use crate::db::Database;
use crate::error::StoreError;
use chrono::{DateTime, Duration, Utc};
use shelf_core::{User, UserId};
use uuid::Uuid;

/// A freshly created session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SessionUserRow {
    id: i64,
    username: String,
    date_joined: DateTime<Utc>,
}

impl Database {
    /// Start a session for `user_id` lasting `max_age`.
    pub async fn create_session(
        &self,
        user_id: UserId,
        max_age: Duration,
    ) -> Result<Session, StoreError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(max_age)
            .ok_or(StoreError::SessionLifetime(max_age))?;
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            expires_at,
        };

        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(user_id.0)
        .bind(now)
        .bind(session.expires_at)
        .execute(self.pool())
        .await?;

        tracing::debug!(user_id = %user_id, "Created session");
        Ok(session)
    }

    /// The user behind an unexpired session token.
    pub async fn session_user(&self, token: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            "SELECT u.id, u.username, u.date_joined FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = ? AND s.expires_at > ?",
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|row| User {
            id: UserId(row.id),
            username: row.username,
            date_joined: row.date_joined,
        }))
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Remove expired sessions, returning how many were deleted.
    pub async fn purge_expired_sessions(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::NewAccount;

    async fn setup() -> (Database, User) {
        let db = Database::in_memory().await.unwrap();
        let user = db
            .create_user(&NewAccount {
                username: "alice".into(),
                password: "alice-pass-1".into(),
            })
            .await
            .unwrap();
        (db, user)
    }

    #[tokio::test]
    async fn unrepresentable_lifetime_is_an_error() {
        let (db, user) = setup().await;
        let err = db.create_session(user.id, Duration::MAX).await.unwrap_err();
        assert!(matches!(err, StoreError::SessionLifetime(_)));
    }

    #[tokio::test]
    async fn session_resolves_to_user() {
        let (db, user) = setup().await;
        let session = db.create_session(user.id, Duration::hours(1)).await.unwrap();

        let resolved = db.session_user(&session.token).await.unwrap();
        assert_eq!(resolved.map(|u| u.username), Some("alice".to_string()));
        assert!(db.session_user("not-a-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleted_session_no_longer_resolves() {
        let (db, user) = setup().await;
        let session = db.create_session(user.id, Duration::hours(1)).await.unwrap();

        db.delete_session(&session.token).await.unwrap();
        assert!(db.session_user(&session.token).await.unwrap().is_none());
        // Deleting twice is fine.
        db.delete_session(&session.token).await.unwrap();
    }

    #[tokio::test]
    async fn expired_sessions_are_ignored_and_purged() {
        let (db, user) = setup().await;
        let expired = db.create_session(user.id, Duration::seconds(-5)).await.unwrap();
        let live = db.create_session(user.id, Duration::hours(1)).await.unwrap();

        assert!(db.session_user(&expired.token).await.unwrap().is_none());
        assert_eq!(db.purge_expired_sessions().await.unwrap(), 1);
        assert!(db.session_user(&live.token).await.unwrap().is_some());
    }
}
