//! crates/docqa_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases, PDF
//! parsers or model APIs.

use async_trait::async_trait;
use crate::domain::{User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("User already exists: {0}")]
    DuplicateUser(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Model call timed out after {0} seconds")]
    ModelTimeout(u64),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persists a new user. Fails with `PortError::DuplicateUser` if the email is taken.
    async fn create_user(&self, email: &str, hashed_password: &str) -> PortResult<User>;

    /// Looks a user up by email. Fails with `PortError::NotFound` if absent.
    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;
}

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Converts an uploaded file into plain text.
    ///
    /// Extraction failures are not errors: implementations log them and return
    /// an empty string so the pipeline can report "no content".
    async fn extract_text(&self, file_bytes: &[u8]) -> String;
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embeds a batch of texts. The result is parallel with `texts`.
    async fn embed_documents(&self, texts: &[String]) -> PortResult<Vec<Vec<f32>>>;

    /// Embeds a single query.
    async fn embed_query(&self, text: &str) -> PortResult<Vec<f32>> {
        self.embed_documents(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PortError::Unexpected("No embedding returned for query".to_string()))
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Produces free-form text for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> PortResult<String>;
}
