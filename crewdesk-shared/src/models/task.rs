/// Task model and database operations
///
/// Tasks live inside a project and may be assigned to any effective member
/// of that project (the owner or an invited member). Assignee validity is
/// enforced by the authorization layer at mutation time; historical
/// assignments are not re-checked.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in-progress', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status task_status NOT NULL DEFAULT 'todo',
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::PublicUser;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Current workflow status
    pub status: TaskStatus,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// Assigned user, if any
    ///
    /// When set, must have been an effective member of the project at the
    /// time of assignment
    pub assignee_id: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Task joined with its assignee's public identity, for API responses
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithAssignee {
    /// The task itself
    #[serde(flatten)]
    pub task: Task,

    /// Assignee identity, None when unassigned
    pub assignee: Option<PublicUser>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Project the task belongs to
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Initial status
    pub status: TaskStatus,

    /// Optional assignee
    pub assignee_id: Option<Uuid>,
}

/// Input for updating an existing task
///
/// Only non-None fields are updated. `assignee_id` is doubly optional:
/// `Some(None)` clears the assignee, `None` leaves it unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New assignee (use Some(None) to clear)
    pub assignee_id: Option<Option<Uuid>>,
}

/// Flat row for the task + assignee join
#[derive(Debug, sqlx::FromRow)]
struct TaskAssigneeRow {
    id: Uuid,
    title: String,
    description: String,
    status: TaskStatus,
    project_id: Uuid,
    assignee_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assignee_email: Option<String>,
}

impl From<TaskAssigneeRow> for TaskWithAssignee {
    fn from(row: TaskAssigneeRow) -> Self {
        let assignee = match (row.assignee_id, row.assignee_email) {
            (Some(id), Some(email)) => Some(PublicUser { id, email }),
            _ => None,
        };

        Self {
            task: Task {
                id: row.id,
                title: row.title,
                description: row.description,
                status: row.status,
                project_id: row.project_id,
                assignee_id: row.assignee_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            assignee,
        }
    }
}

const TASK_ASSIGNEE_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.status, t.project_id, t.assignee_id,
           t.created_at, t.updated_at, u.email AS assignee_email
    FROM tasks t
    LEFT JOIN users u ON u.id = t.assignee_id
"#;

impl Task {
    /// Creates a new task in a project
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<TaskWithAssignee, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, project_id, assignee_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, status, project_id, assignee_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.project_id)
        .bind(data.assignee_id)
        .fetch_one(pool)
        .await?;

        // Re-read through the join so the response carries the assignee email
        match Self::find_detail(pool, task.id).await? {
            Some(detail) => Ok(detail),
            None => Ok(TaskWithAssignee {
                task,
                assignee: None,
            }),
        }
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, project_id, assignee_id,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID joined with its assignee's public identity
    pub async fn find_detail(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
        let query = format!("{} WHERE t.id = $1", TASK_ASSIGNEE_SELECT);

        let row = sqlx::query_as::<_, TaskAssigneeRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskWithAssignee::from))
    }

    /// Lists all tasks in a project with their assignees
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        let query = format!(
            "{} WHERE t.project_id = $1 ORDER BY t.created_at ASC",
            TASK_ASSIGNEE_SELECT
        );

        let rows = sqlx::query_as::<_, TaskAssigneeRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskWithAssignee::from).collect())
    }

    /// Updates a task
    ///
    /// Only fields present in `data` are touched; `updated_at` is always
    /// refreshed. Returns the updated task with its assignee, or None if
    /// the task doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, status, project_id, \
             assignee_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(assignee) = data.assignee_id {
            q = q.bind(assignee);
        }

        let task = q.fetch_optional(pool).await?;

        match task {
            Some(task) => Self::find_detail(pool, task.id).await,
            None => Ok(None),
        }
    }

    /// Deletes a task by ID
    ///
    /// Returns true if a task was deleted, false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
