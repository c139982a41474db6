//! crates/docqa_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use serde::{Deserialize, Serialize};

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub email: String,
    pub hashed_password: String,
}

impl UserCredentials {
    pub fn to_user(&self) -> User {
        User {
            email: self.email.clone(),
        }
    }
}

/// A bounded slice of a document's text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Identifies the document the chunk was cut from (usually the upload's file name).
    pub source_tag: String,
}

/// One entry of the job-title reference data used by the resume-matching policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTitle {
    pub title: String,
    pub skills: Vec<String>,
}

/// The result of asking a question against the document slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// No document has been uploaded yet.
    NoDocument,
    /// A document was uploaded but produced no indexable text.
    NoContent,
    Answered(String),
}
