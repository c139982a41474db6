//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CredentialStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docqa_core::domain::{User, UserCredentials};
use docqa_core::ports::{CredentialStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CredentialStore` port.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Creates a new `PgCredentialStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    email: String,
    hashed_password: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

//=========================================================================================
// `CredentialStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        // ON CONFLICT DO NOTHING returns no row when the email is already taken.
        let inserted: Option<(String,)> = sqlx::query_as(
            "INSERT INTO users (email, hashed_password) VALUES ($1, $2) \
             ON CONFLICT (email) DO NOTHING RETURNING email",
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        match inserted {
            Some((email,)) => Ok(User { email }),
            None => Err(PortError::DuplicateUser(email.to_string())),
        }
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record: UserRecord = sqlx::query_as(
            "SELECT email, hashed_password, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => PortError::Unexpected(e.to_string()),
        })?;

        Ok(record.to_domain())
    }
}
