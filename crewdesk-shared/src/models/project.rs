/// Project model and database operations
///
/// Projects are the top-level collaboration resource. Every project has
/// exactly one owner for its entire lifetime; ownership never transfers.
/// Non-owner participants are tracked by the Membership model.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (owner_id, name)
/// );
/// ```
///
/// Project names are unique per owner, not globally. Deleting a project
/// cascades to its memberships and tasks at the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model representing a collaboration workspace
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project name, unique per owner
    pub name: String,

    /// User who owns the project
    ///
    /// Stable for the project's lifetime; the owner never has an explicit
    /// membership row
    pub owner_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Owner user ID
    pub owner_id: Uuid,
}

impl Project {
    /// Creates a new project owned by the given user
    ///
    /// # Errors
    ///
    /// Returns an error if the (owner_id, name) pair already exists
    /// (unique constraint violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, owner_id, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Checks whether the owner already has a project with this name
    ///
    /// Used for the per-owner uniqueness precondition on create and rename.
    /// `exclude` skips the project being renamed so a no-op rename passes.
    pub async fn name_taken(
        pool: &PgPool,
        owner_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM projects
                WHERE owner_id = $1 AND name = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(exclude)
        .fetch_one(pool)
        .await?;

        Ok(taken)
    }

    /// Renames a project
    ///
    /// Returns the updated project, or None if the project doesn't exist.
    pub async fn rename(
        pool: &PgPool,
        id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project by ID
    ///
    /// Memberships and tasks cascade at the storage layer.
    ///
    /// Returns true if a project was deleted, false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all projects owned by a user
    pub async fn list_owned(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, owner_id, created_at, updated_at
            FROM projects
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Lists all projects where the user has a membership row
    pub async fn list_joined(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.owner_id, p.created_at, p.updated_at
            FROM projects p
            INNER JOIN memberships m ON m.project_id = p.id
            WHERE m.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }
}
