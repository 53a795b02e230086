/// User directory endpoint
///
/// Lists every registered user's public identity, so project owners can
/// find people to invite.
///
/// # Endpoints
///
/// - `GET /api/v1/users` - List all users ({id, email}, email ascending)

use crate::{app::AppState, error::ApiResult, response::ApiResponse};
use axum::extract::State;
use crewdesk_shared::models::user::{PublicUser, User};

/// List all users
pub async fn list_users(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<Vec<PublicUser>>> {
    let users = User::list_public(&state.db).await?;

    Ok(ApiResponse::ok("Users fetched successfully", users))
}
