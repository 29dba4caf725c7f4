//! User accounts with Argon2 password hashes.

use crate::db::Database;
use crate::error::StoreError;
use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use shelf_core::{NewAccount, User, UserId};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String, // Argon2 PHC string
    date_joined: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId(row.id),
            username: row.username,
            date_joined: row.date_joined,
        }
    }
}

impl Database {
    /// Create an account. Fails with `UsernameTaken` if the name is in use.
    pub async fn create_user(&self, account: &NewAccount) -> Result<User, StoreError> {
        if self.find_user_by_username(&account.username).await?.is_some() {
            return Err(StoreError::UsernameTaken);
        }

        let hash = hash_password(&account.password)?;
        let date_joined = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, date_joined) VALUES (?, ?, ?)",
        )
        .bind(&account.username)
        .bind(hash)
        .bind(date_joined)
        .execute(self.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UsernameTaken,
            other => StoreError::Database(other),
        })?;

        let user = User {
            id: UserId(result.last_insert_rowid()),
            username: account.username.clone(),
            date_joined,
        };
        tracing::info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(user)
    }

    /// Check credentials. Returns the user when the password matches.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, date_joined FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let parsed_hash = PasswordHash::new(&row.password_hash)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
        {
            Ok(Some(row.into()))
        } else {
            Ok(None)
        }
    }

    /// Look up a user by username.
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, date_joined FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(User::from))
    }

    /// Number of registered accounts.
    pub async fn count_users(&self) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(1) FROM users")
            .fetch_one(self.pool())
            .await?;
        Ok(count.0)
    }
}

fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::PasswordHash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(username: &str, password: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_authenticate() {
        let db = Database::in_memory().await.unwrap();
        let created = db.create_user(&account("alice", "s3cret-pass")).await.unwrap();

        let user = db.authenticate("alice", "s3cret-pass").await.unwrap();
        assert_eq!(user.map(|u| u.id), Some(created.id));

        assert!(db.authenticate("alice", "wrong-pass").await.unwrap().is_none());
        assert!(db.authenticate("nobody", "s3cret-pass").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let db = Database::in_memory().await.unwrap();
        db.create_user(&account("alice", "s3cret-pass")).await.unwrap();

        let err = db.create_user(&account("alice", "other-pass")).await.unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken));
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn password_is_not_stored_in_plain_text() {
        let db = Database::in_memory().await.unwrap();
        db.create_user(&account("alice", "s3cret-pass")).await.unwrap();

        let (hash,): (String,) = sqlx::query_as("SELECT password_hash FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("s3cret-pass"));
    }
}
