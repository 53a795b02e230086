/// Task endpoints
///
/// Tasks are managed by any participant of the owning project — access is
/// symmetric with reading. The assignment validator runs on create and on
/// update whenever an assignee is supplied; clearing is always allowed.
///
/// # Endpoints
///
/// - `GET    /api/v1/tasks/:projectId` - List a project's tasks
/// - `POST   /api/v1/tasks/:projectId` - Create a task
/// - `GET    /api/v1/tasks/detail/:taskId` - Task detail
/// - `PUT    /api/v1/tasks/detail/:taskId` - Update a task
/// - `DELETE /api/v1/tasks/detail/:taskId` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    patch::Patch,
    response::ApiResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewdesk_shared::{
    auth::{
        authorization::{decide, validate_assignee, Action, ProjectAccess},
        middleware::AuthContext,
    },
    models::{
        project::Project,
        task::{CreateTask, Task, TaskStatus, TaskWithAssignee, UpdateTask},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 3, message = "Task title must be at least 3 characters"))]
    pub title: String,

    /// Task description
    #[validate(length(min = 5, message = "Task description must be at least 5 characters"))]
    pub description: String,

    /// Initial status
    pub status: TaskStatus,

    /// Optional assignee (must be an effective member)
    pub assignee_id: Option<Uuid>,
}

/// Update task request
///
/// All fields optional; the assignee is a three-way patch field so
/// "leave unchanged" and "clear" stay distinct.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New assignee: absent = keep, null/empty = clear, value = set
    #[serde(default)]
    pub assignee_id: Patch<Uuid>,
}

/// Loads a task and its owning project, or maps absence to a 404
///
/// A task whose project was deleted no longer exists (cascade), so both
/// lookups surface as "Task not found".
async fn load_task_and_project(state: &AppState, task_id: Uuid) -> ApiResult<(Task, Project)> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let project = Project::find_by_id(&state.db, task.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok((task, project))
}

/// List a project's tasks with their assignees
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Vec<TaskWithAssignee>>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let access = ProjectAccess::load(&state.db, &project).await?;
    decide(auth.user_id, &access, Action::ViewTasks)?;

    let tasks = Task::list_by_project(&state.db, project.id).await?;

    Ok(ApiResponse::ok("Tasks retrieved successfully", tasks))
}

/// Create a task in a project
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<ApiResponse<TaskWithAssignee>> {
    req.validate().map_err(ApiError::from_validation)?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let access = ProjectAccess::load(&state.db, &project).await?;
    decide(auth.user_id, &access, Action::CreateTask)?;
    validate_assignee(&access, req.assignee_id)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: project.id,
            title: req.title,
            description: req.description,
            status: req.status,
            assignee_id: req.assignee_id,
        },
    )
    .await?;

    Ok(ApiResponse::created("Task created successfully", task))
}

/// Task detail with its assignee
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<ApiResponse<TaskWithAssignee>> {
    let (task, project) = load_task_and_project(&state, task_id).await?;

    let access = ProjectAccess::load(&state.db, &project).await?;
    decide(auth.user_id, &access, Action::ViewTask)?;

    let detail = Task::find_detail(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(ApiResponse::ok("Task retrieved successfully", detail))
}

/// Update a task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<ApiResponse<TaskWithAssignee>> {
    req.validate().map_err(ApiError::from_validation)?;

    let (task, project) = load_task_and_project(&state, task_id).await?;

    let access = ProjectAccess::load(&state.db, &project).await?;
    decide(auth.user_id, &access, Action::UpdateTask)?;

    // Assignment soundness is checked only when a new assignee is supplied;
    // clearing never needs membership
    if let Some(&assignee) = req.assignee_id.set_value() {
        validate_assignee(&access, Some(assignee))?;
    }

    let updated = Task::update(
        &state.db,
        task.id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            assignee_id: req.assignee_id.into_update(),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(ApiResponse::ok("Task updated successfully", updated))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let (task, project) = load_task_and_project(&state, task_id).await?;

    let access = ProjectAccess::load(&state.db, &project).await?;
    decide(auth.user_id, &access, Action::DeleteTask)?;

    Task::delete(&state.db, task.id).await?;

    Ok(ApiResponse::ok(
        "Task deleted successfully",
        serde_json::json!({}),
    ))
}
