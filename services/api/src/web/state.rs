//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::token::TokenService;
use docqa_core::pipeline::QaPipeline;
use docqa_core::ports::CredentialStore;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn CredentialStore>,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    /// Extraction, indexing and answering around the single document slot.
    pub pipeline: Arc<QaPipeline>,
}
