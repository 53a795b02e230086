/// JWT token generation and validation module
///
/// Tokens are signed with HS256 (HMAC-SHA256) and carry the verified
/// identity pair: the user ID as `sub` plus the user's email as a custom
/// claim. Tokens expire after 7 days.
///
/// # Example
///
/// ```
/// use crewdesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(Uuid::new_v4(), "user@example.com".to_string());
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes!!")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes!!")?;
/// assert_eq!(validated.sub, claims.sub);
/// assert_eq!(validated.email, "user@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer embedded in every token
const ISSUER: &str = "crewdesk";

/// Token lifetime: 7 days
const TOKEN_LIFETIME_DAYS: i64 = 7;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims structure
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`) plus the user's
/// email, so handlers get the full verified identity context without a
/// second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// User email (custom claim)
    pub email: String,

    /// Issuer - always "crewdesk"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates new claims expiring in 7 days
    pub fn new(user_id: Uuid, email: String) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::days(TOKEN_LIFETIME_DAYS);

        Self {
            sub: user_id,
            email,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// # Security
///
/// The secret should be at least 32 bytes, randomly generated, and stored
/// outside the source tree (environment variable or secret manager).
///
/// # Errors
///
/// Returns `JwtError::CreateError` if signing fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Validates a JWT token and returns its claims
///
/// Checks the signature, expiration (`exp`), not-before (`nbf`), and
/// issuer.
///
/// # Errors
///
/// - `JwtError::Expired` if the token is past its expiration
/// - `JwtError::ValidationError` for any other validation failure
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::ValidationError(e.to_string()),
        }
    })?;

    Ok(token_data.claims)
}
