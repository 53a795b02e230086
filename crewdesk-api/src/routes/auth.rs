/// Authentication endpoints
///
/// This module provides user registration and login. Both endpoints are
/// public and produce the JWT bearer credential carrying the verified
/// (user id, email) identity that every other endpoint requires.
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Register a new user
/// - `POST /api/v1/auth/login` - Login and get a token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{extract::State, Json};
use crewdesk_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, PublicUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Payload returned by both register and login
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    /// Bearer token (7-day expiry)
    pub token: String,

    /// The authenticated user's public identity
    pub user: PublicUser,
}

/// Register a new user
///
/// # Errors
///
/// - `400`: validation failed, or email already registered
/// - `500`: server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<ApiResponse<AuthPayload>> {
    req.validate().map_err(ApiError::from_validation)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Denied("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // The unique email constraint backstops a concurrent duplicate register
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let claims = jwt::Claims::new(user.id, user.email.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(ApiResponse::ok(
        "User registered successfully",
        AuthPayload {
            token,
            user: user.into(),
        },
    ))
}

/// Login
///
/// # Errors
///
/// - `400`: validation failed, unknown email, or wrong password
/// - `500`: server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<ApiResponse<AuthPayload>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Denied("Email not registered".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Denied("Invalid credentials".to_string()));
    }

    let claims = jwt::Claims::new(user.id, user.email.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(ApiResponse::ok(
        "Login successful",
        AuthPayload {
            token,
            user: user.into(),
        },
    ))
}
