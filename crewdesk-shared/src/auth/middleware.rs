/// Authentication support for Axum handlers
///
/// This module resolves a bearer credential into the verified identity
/// context attached to every authenticated request. Verification is two
/// steps: validate the JWT, then confirm the subject user still exists — a
/// token for a deleted account is rejected.
///
/// The API crate wires [`authenticate`] into an Axum middleware layer and
/// handlers extract the resulting [`AuthContext`] from request extensions.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use crewdesk_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {} <{}>", auth.user_id, auth.email)
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::User;

/// Verified identity context added to request extensions
///
/// Carries the (user id, email) pair the authorization core trusts. Only
/// constructed after both token validation and user resolution succeed.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Authenticated user's email
    pub email: String,
}

/// Error type for credential verification
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing or malformed authorization header
    #[error("No token provided")]
    MissingCredentials,

    /// Token validation failed (bad signature, expired, wrong issuer)
    #[error("Token is invalid or expired")]
    InvalidToken(#[source] JwtError),

    /// Token subject no longer exists
    #[error("User not found")]
    UnknownUser,

    /// Database error during user resolution
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Resolves an `Authorization` header value into a verified identity
///
/// # Arguments
///
/// * `pool` - Database connection pool (for user resolution)
/// * `secret` - JWT signing secret
/// * `auth_header` - Raw `Authorization` header value, if present
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if the header is absent or not a
///   Bearer token
/// - `AuthError::InvalidToken` if validation fails
/// - `AuthError::UnknownUser` if the token's subject has no user row
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    auth_header: Option<&str>,
) -> Result<AuthContext, AuthError> {
    let token = auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingCredentials)?;

    let claims = validate_token(token, secret).map_err(AuthError::InvalidToken)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    Ok(AuthContext {
        user_id: user.id,
        email: user.email,
    })
}
