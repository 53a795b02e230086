/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`, which converts to the wire
/// envelope `{statusCode, message, errors}`.
///
/// The status contract is the externally observable form of the
/// authorization core's verdicts:
///
/// - 400: policy denial or validation failure
/// - 401: missing or invalid credential
/// - 404: resource not found
/// - 500: unexpected failure (detail logged, never sent to the client)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crewdesk_shared::auth::{
    authorization::AccessDenied, jwt::JwtError, middleware::AuthError, password::PasswordError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Field name → list of validation messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid credential (401)
    Unauthenticated(String),

    /// Authorization or domain precondition denial (400)
    Denied(String),

    /// Resource not found (404)
    NotFound(String),

    /// Request body validation failure (400, with field errors)
    Validation(FieldErrors),

    /// Unexpected failure (500); detail is logged, not exposed
    Internal(String),
}

impl ApiError {
    /// Builds a validation error from `validator` output
    ///
    /// Produces the same field → messages shape the transport contract
    /// specifies, with duplicate messages per field removed.
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let mut formatted: FieldErrors = BTreeMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages = formatted.entry(field.to_string()).or_default();
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string());
                if !messages.contains(&message) {
                    messages.push(message);
                }
            }
        }

        ApiError::Validation(formatted)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthenticated(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Denied(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} fields", errors.len())
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Error response envelope
///
/// `errors` is omitted for not-found and unauthenticated responses,
/// `null` for plain denials, and a field map for validation failures.
#[derive(Debug, Serialize)]
struct ErrorBody {
    #[serde(rename = "statusCode")]
    status_code: u16,

    message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Denied(msg) => (StatusCode::BAD_REQUEST, msg, Some(Value::Null)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Validation(field_errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(serde_json::to_value(field_errors).unwrap_or(Value::Null)),
            ),
            ApiError::Internal(detail) => {
                // Full detail goes to the log only
                tracing::error!("Unhandled error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                    Some(Value::Null),
                )
            }
        };

        let body = Json(ErrorBody {
            status_code: status.as_u16(),
            message,
            errors,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique-constraint violations are the backstop for the check-then-act
/// sequences in project create/rename and invite: a concurrent duplicate
/// loses with the same 400 the pre-check would have produced.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("users_email") {
                        return ApiError::Denied("Email already registered".to_string());
                    }
                    if constraint.contains("projects_owner_id_name") {
                        return ApiError::Denied(
                            "Project with this name already exists".to_string(),
                        );
                    }
                    if constraint.contains("memberships_project_id_user_id") {
                        return ApiError::Denied("User already a member".to_string());
                    }
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert credential verification errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DatabaseError(e) => ApiError::Internal(format!("Database error: {}", e)),
            other => ApiError::Unauthenticated(other.to_string()),
        }
    }
}

/// Convert authorization denials to API errors
impl From<AccessDenied> for ApiError {
    fn from(err: AccessDenied) -> Self {
        ApiError::Denied(err.0.to_string())
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert token creation errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::Internal(format!("Token operation failed: {}", err))
    }
}
