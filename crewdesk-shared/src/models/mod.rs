/// Database models for CrewDesk
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts
/// - `project`: Collaboration projects with a single immutable owner
/// - `membership`: The ledger of non-owner project participation
/// - `task`: Tasks inside a project, optionally assigned to a member
///
/// # Example
///
/// ```no_run
/// use crewdesk_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod membership;
pub mod project;
pub mod task;
pub mod user;
