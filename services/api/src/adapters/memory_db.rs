//! services/api/src/adapters/memory_db.rs
//!
//! A process-local `CredentialStore`, used when no `DATABASE_URL` is configured
//! and by the test suite. Records are lost on restart.

use async_trait::async_trait;
use docqa_core::domain::{User, UserCredentials};
use docqa_core::ports::{CredentialStore, PortError, PortResult};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let mut users = self.users.write();
        if users.contains_key(email) {
            return Err(PortError::DuplicateUser(email.to_string()));
        }
        users.insert(email.to_string(), hashed_password.to_string());
        Ok(User {
            email: email.to_string(),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .read()
            .get(email)
            .map(|hash| UserCredentials {
                email: email.to_string(),
                hashed_password: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }
}
