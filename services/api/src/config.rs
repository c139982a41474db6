//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which prompt the answer engine uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerPolicyKind {
    /// Free-form answers grounded in the document.
    Open,
    /// Resume matching against the job-title catalog.
    JobTitle,
}

impl FromStr for AnswerPolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "open_ended" => Ok(Self::Open),
            "job_title" | "job-title" | "classification" => Ok(Self::JobTitle),
            other => Err(format!("'{}' is not one of: open, job_title", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: Option<String>,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub qa_model: String,
    pub embedding_model: String,
    pub jwt_secret: String,
    pub token_expiry_minutes: i64,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub answer_policy: AnswerPolicyKind,
    pub clean_output: bool,
    pub job_titles_path: Option<PathBuf>,
    pub model_timeout_secs: u64,
    pub model_max_retries: u32,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address: SocketAddr = parse_or(&lookup, "BIND_ADDRESS", "0.0.0.0:8000".parse().ok())?;
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Model Settings ---
        let openai_api_key = lookup("OPENAI_API_KEY");
        let openai_base_url = lookup("OPENAI_BASE_URL");
        let qa_model = lookup("QA_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let embedding_model =
            lookup("EMBEDDING_MODEL").unwrap_or_else(|| "text-embedding-3-small".to_string());
        let model_timeout_secs = parse_or(&lookup, "MODEL_TIMEOUT_SECS", Some(60))?;
        let model_max_retries = parse_or(&lookup, "MODEL_MAX_RETRIES", Some(2))?;

        // --- Load Auth Settings ---
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("JWT_SECRET".to_string()))?;
        let token_expiry_minutes: i64 = parse_or(&lookup, "TOKEN_EXPIRY_MINUTES", Some(60))?;
        if token_expiry_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "TOKEN_EXPIRY_MINUTES".to_string(),
                "must be positive".to_string(),
            ));
        }

        // --- Load Pipeline Settings ---
        let chunk_size = parse_or(&lookup, "CHUNK_SIZE", Some(docqa_core::chunking::DEFAULT_CHUNK_SIZE))?;
        let chunk_overlap =
            parse_or(&lookup, "CHUNK_OVERLAP", Some(docqa_core::chunking::DEFAULT_CHUNK_OVERLAP))?;
        let top_k = parse_or(&lookup, "RETRIEVAL_TOP_K", Some(docqa_core::engine::DEFAULT_TOP_K))?;
        let answer_policy = parse_or(&lookup, "ANSWER_POLICY", Some(AnswerPolicyKind::Open))?;
        let clean_output = parse_or(&lookup, "CLEAN_OUTPUT", Some(true))?;
        let job_titles_path = lookup("JOB_TITLES_PATH").map(PathBuf::from);

        // --- Load HTTP Settings ---
        let cors_origin = lookup("CORS_ORIGIN").unwrap_or_else(|| "*".to_string());
        let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", Some(10 * 1024 * 1024))?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            openai_base_url,
            qa_model,
            embedding_model,
            jwt_secret,
            token_expiry_minutes,
            chunk_size,
            chunk_overlap,
            top_k,
            answer_policy,
            clean_output,
            job_titles_path,
            model_timeout_secs,
            model_max_retries,
            cors_origin,
            max_upload_bytes,
        })
    }
}

/// Parses `key` if set, otherwise falls back to `default` (a `None` default makes the key required).
fn parse_or<T, F>(lookup: &F, key: &str, default: Option<T>) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => default.ok_or_else(|| ConfigError::MissingVar(key.to_string())),
    }
}
