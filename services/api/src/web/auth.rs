//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup and login, plus the account
//! helpers they are built on.

use crate::error::AppError;
use crate::web::state::AppState;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use docqa_core::domain::User;
use docqa_core::ports::{CredentialStore, PortError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn};
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

//=========================================================================================
// Password Hashing
//=========================================================================================

/// Hashes `password` with Argon2id and a fresh random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored PHC string. Unparseable hashes never verify.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match PasswordHash::new(hashed_password) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(e) => {
            error!("Failed to parse stored password hash: {:?}", e);
            false
        }
    }
}

/// A hash of a throwaway password, verified against when the email is unknown
/// so that failed logins cost one Argon2 verification either way.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(b"docqa-unknown-user", &salt)
            .map(|hash| hash.to_string())
            .unwrap_or_default()
    })
}

//=========================================================================================
// Account Operations
//=========================================================================================

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if !email_pattern().is_match(email) {
        return Err(AppError::BadRequest("A valid email address is required".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".to_string()));
    }
    Ok(())
}

/// Registers a new user, storing only the password hash.
pub async fn create_account(
    db: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = email.trim();
    validate_credentials(email, password)?;

    let password_hash = hash_password(password)?;
    let user = db.create_user(email, &password_hash).await?;
    info!("Created user {}", user.email);
    Ok(user)
}

/// Checks an email/password pair against the credential store.
pub async fn authenticate(
    db: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let user_creds = match db.get_user_by_email(email.trim()).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => {
            let _ = verify_password(password, dummy_hash());
            return Err(AppError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(password, &user_creds.hashed_password) {
        warn!("Failed login attempt for {}", user_creds.email);
        return Err(AppError::InvalidCredentials);
    }
    Ok(user_creds.to_user())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /signup - Create a new user account
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created", body = MessageResponse),
        (status = 400, description = "Email already registered or invalid input"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    create_account(state.db.as_ref(), &req.email, &req.password).await?;
    Ok(Json(MessageResponse {
        message: "User created".to_string(),
    }))
}

/// POST /login - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = authenticate(state.db.as_ref(), &req.email, &req.password).await?;

    let access_token = state
        .tokens
        .issue(&user.email)
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
