//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use docqa_core::domain::User;
use docqa_core::ports::PortError;
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::AppError;
use crate::web::state::AppState;

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::InvalidToken)?;

    let (scheme, token) = value.trim().split_once(' ').ok_or(AppError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::InvalidToken);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::InvalidToken);
    }
    Ok(token)
}

/// Middleware that validates the bearer token and resolves the user it names.
///
/// If valid, inserts the `User` into request extensions for handlers to use.
/// A missing or malformed header, a token that fails validation, or a subject
/// with no matching user all yield 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract the bearer token
    let token = bearer_token(req.headers())?;

    // 2. Validate signature and expiry, get the subject
    let email = state.tokens.validate(token).ok_or(AppError::InvalidToken)?;

    // 3. Confirm the user still exists
    let user = match state.db.get_user_by_email(&email).await {
        Ok(creds) => creds.to_user(),
        Err(PortError::NotFound(_)) => {
            warn!("Valid token for unknown user {}", email);
            return Err(AppError::UnknownUser);
        }
        Err(e) => {
            error!("Failed to look up user {}: {:?}", email, e);
            return Err(AppError::Internal(e.to_string()));
        }
    };

    // 4. Insert the user into request extensions
    req.extensions_mut().insert::<User>(user);

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
