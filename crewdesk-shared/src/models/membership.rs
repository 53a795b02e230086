/// Membership model and database operations
///
/// This module provides the Membership model recording non-owner
/// participation in projects. It is the authoritative ledger for the
/// authorization core: a user may access a project iff they own it or have
/// a membership row for it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE memberships (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (project_id, user_id)
/// );
/// ```
///
/// # Invariants
///
/// - A (project_id, user_id) pair is unique: a user cannot be invited twice.
/// - The project owner never has a membership row; owner participation is
///   derived from `projects.owner_id`.
///
/// # Example
///
/// ```no_run
/// use crewdesk_shared::models::membership::{Membership, CreateMembership};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let membership = Membership::create(&pool, CreateMembership {
///     project_id,
///     user_id,
/// }).await?;
///
/// let is_member = Membership::exists(&pool, project_id, user_id).await?;
/// assert!(is_member);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership model representing a user's participation in a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Unique membership ID
    pub id: Uuid,

    /// Project the user participates in
    pub project_id: Uuid,

    /// Participating user
    pub user_id: Uuid,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,
}

/// A project member as rendered in API responses: user id plus email
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    /// Member's user ID
    #[serde(rename = "userId")]
    pub user_id: Uuid,

    /// Member's email address
    pub email: String,
}

impl Membership {
    /// Creates a new membership (adds a user to a project)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The membership already exists (unique constraint violation)
    /// - Project or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateMembership) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (project_id, user_id)
            VALUES ($1, $2)
            RETURNING id, project_id, user_id, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Checks whether a membership row exists for the pair
    pub async fn exists(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Deletes the membership for (project_id, user_id)
    ///
    /// Returns true if a row was deleted, false if no membership existed.
    /// Callers must treat false as NotFound, never as silent success.
    pub async fn delete(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM memberships WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the user IDs of all explicit members of a project
    ///
    /// Does NOT include the owner; union with `projects.owner_id` is done
    /// by the authorization layer's access snapshot.
    pub async fn member_ids(pool: &PgPool, project_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM memberships
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Lists a project's members joined with their emails, for responses
    pub async fn list_members(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMember>, sqlx::Error> {
        let members = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT m.user_id, u.email
            FROM memberships m
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}
