/// Project endpoints
///
/// Lifecycle operations over projects and their membership ledger. Every
/// handler follows the same shape: load the resource, build the membership
/// snapshot, ask the decision procedure for a verdict, run the domain
/// preconditions, then mutate.
///
/// # Endpoints
///
/// - `GET    /api/v1/projects` - List projects the identity can access
/// - `POST   /api/v1/projects` - Create a project (caller becomes owner)
/// - `GET    /api/v1/projects/:id` - Project detail with members and tasks
/// - `PUT    /api/v1/projects/:id` - Rename (owner only)
/// - `DELETE /api/v1/projects/:id` - Delete (owner only, cascades)
/// - `POST   /api/v1/projects/:id/invite` - Invite a user by email (owner only)
/// - `DELETE /api/v1/projects/:id/members/:userId` - Remove a member (owner only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewdesk_shared::{
    auth::{
        authorization::{decide, Action, ProjectAccess},
        middleware::AuthContext,
    },
    models::{
        membership::{CreateMembership, Membership, ProjectMember},
        project::{CreateProject, Project},
        task::{Task, TaskWithAssignee},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;
use validator::Validate;

/// Create / rename request
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectNameRequest {
    /// Project name
    #[validate(length(min = 3, message = "Project name must be at least 3 characters"))]
    pub name: String,
}

/// Invite request
#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    /// Email of the user to invite
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// A project with its member list, as returned by the list endpoint
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    /// The project itself
    #[serde(flatten)]
    pub project: Project,

    /// Simplified member list (excludes the owner)
    pub members: Vec<ProjectMember>,
}

/// Full project detail: members plus tasks
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    /// The project itself
    #[serde(flatten)]
    pub project: Project,

    /// Simplified member list (excludes the owner)
    pub members: Vec<ProjectMember>,

    /// The project's tasks
    pub tasks: Vec<TaskWithAssignee>,
}

/// Name ordering for project listings
///
/// Locale-style: case-insensitive primary comparison, raw-name tiebreak,
/// so "apple" sorts before "Banana".
fn name_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Loads a project or maps its absence to a 404
async fn load_project(state: &AppState, id: Uuid) -> ApiResult<Project> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

/// List projects accessible to the identity
///
/// Owned projects ∪ projects with a membership row, sorted by name. The
/// two sets cannot overlap: the owner never has a membership row.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<Vec<ProjectSummary>>> {
    let owned = Project::list_owned(&state.db, auth.user_id).await?;
    let joined = Project::list_joined(&state.db, auth.user_id).await?;

    let mut summaries = Vec::with_capacity(owned.len() + joined.len());
    for project in owned.into_iter().chain(joined) {
        let members = Membership::list_members(&state.db, project.id).await?;
        summaries.push(ProjectSummary { project, members });
    }

    summaries.sort_by(|a, b| name_cmp(&a.project.name, &b.project.name));

    Ok(ApiResponse::ok("Projects retrieved successfully", summaries))
}

/// Create a project owned by the caller
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ProjectNameRequest>,
) -> ApiResult<ApiResponse<Project>> {
    req.validate().map_err(ApiError::from_validation)?;

    if Project::name_taken(&state.db, auth.user_id, &req.name, None).await? {
        return Err(ApiError::Denied(
            "Project with this name already exists".to_string(),
        ));
    }

    // The (owner_id, name) unique constraint backstops a concurrent
    // duplicate create with the same 400
    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            owner_id: auth.user_id,
        },
    )
    .await?;

    Ok(ApiResponse::created("Project created successfully", project))
}

/// Project detail with members and tasks
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<ProjectDetail>> {
    let project = load_project(&state, id).await?;
    let access = ProjectAccess::load(&state.db, &project).await?;

    decide(auth.user_id, &access, Action::ViewProject)?;

    let members = Membership::list_members(&state.db, project.id).await?;
    let tasks = Task::list_by_project(&state.db, project.id).await?;

    Ok(ApiResponse::ok(
        "Project detail fetched successfully",
        ProjectDetail {
            project,
            members,
            tasks,
        },
    ))
}

/// Rename a project (owner only)
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProjectNameRequest>,
) -> ApiResult<ApiResponse<Project>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = load_project(&state, id).await?;
    let access = ProjectAccess::load(&state.db, &project).await?;

    decide(auth.user_id, &access, Action::UpdateProject)?;

    // Uniqueness check excludes the row being renamed
    if Project::name_taken(&state.db, project.owner_id, &req.name, Some(project.id)).await? {
        return Err(ApiError::Denied(
            "Project with this name already exists".to_string(),
        ));
    }

    let updated = Project::rename(&state.db, project.id, &req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(ApiResponse::ok("Project updated successfully", updated))
}

/// Delete a project (owner only; memberships and tasks cascade)
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let project = load_project(&state, id).await?;
    let access = ProjectAccess::load(&state.db, &project).await?;

    decide(auth.user_id, &access, Action::DeleteProject)?;

    Project::delete(&state.db, project.id).await?;

    Ok(ApiResponse::ok(
        "Project deleted successfully",
        serde_json::json!({}),
    ))
}

/// Invite a user into a project (owner only)
///
/// Precondition order matters: the target user is resolved before any
/// comparison against it, so an unknown email is a clean 404 rather than
/// a fault.
pub async fn invite_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<InviteRequest>,
) -> ApiResult<ApiResponse<Membership>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = load_project(&state, id).await?;
    let access = ProjectAccess::load(&state.db, &project).await?;

    decide(auth.user_id, &access, Action::InviteMember)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if access.is_owner(user.id) {
        return Err(ApiError::Denied("You cannot invite yourself".to_string()));
    }

    if access.is_listed_member(user.id) {
        return Err(ApiError::Denied("User already a member".to_string()));
    }

    // The (project_id, user_id) unique constraint backstops a concurrent
    // duplicate invite with the same 400
    let membership = Membership::create(
        &state.db,
        CreateMembership {
            project_id: project.id,
            user_id: user.id,
        },
    )
    .await?;

    Ok(ApiResponse::created(
        "Member invited successfully",
        membership,
    ))
}

/// Remove a member from a project (owner only)
///
/// The owner is never removable, and removing a user who has no membership
/// row is a 404, never a silent success.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let project = load_project(&state, id).await?;
    let access = ProjectAccess::load(&state.db, &project).await?;

    decide(auth.user_id, &access, Action::RemoveMember)?;

    if access.is_owner(user_id) {
        return Err(ApiError::Denied(
            "Owner cannot be removed from the project".to_string(),
        ));
    }

    let removed = Membership::delete(&state.db, project.id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound(
            "Member not found in this project".to_string(),
        ));
    }

    Ok(ApiResponse::ok(
        "Member removed successfully",
        serde_json::json!({}),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_cmp_is_case_insensitive_primary() {
        let mut names = vec!["cherry", "Banana", "apple"];
        names.sort_by(|a, b| name_cmp(a, b));
        assert_eq!(names, vec!["apple", "Banana", "cherry"]);
    }

    #[test]
    fn test_name_cmp_tiebreaks_on_case() {
        assert_eq!(name_cmp("roadmap", "roadmap"), Ordering::Equal);
        assert_ne!(name_cmp("Roadmap", "roadmap"), Ordering::Equal);
    }

    #[test]
    fn test_project_name_validation() {
        let ok = ProjectNameRequest {
            name: "Roadmap".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = ProjectNameRequest {
            name: "ab".to_string(),
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_invite_request_validation() {
        let ok = InviteRequest {
            email: "member@example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = InviteRequest {
            email: "nope".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
