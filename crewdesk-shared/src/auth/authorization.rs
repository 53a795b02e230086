/// Authorization decision procedure and membership checks
///
/// This module is the authorization core: given a verified identity, a
/// snapshot of a project's effective membership, and the operation being
/// attempted, it decides Allow or Deny with a human-readable reason.
///
/// # Permission Model
///
/// Two levels only:
///
/// 1. **Owner**: project metadata mutation (rename, delete) and membership
///    administration (invite, remove)
/// 2. **Participant** (owner or invited member): everything else — reading
///    the project and creating, reading, updating, and deleting its tasks
///
/// Owner participation is derived from `projects.owner_id`; invited
/// participation is an explicit membership row. [`ProjectAccess`] unions
/// the two behind a single `is_participant` predicate so call sites never
/// duplicate that logic.
///
/// # Example
///
/// ```
/// use crewdesk_shared::auth::authorization::{decide, Action, ProjectAccess};
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let member = Uuid::new_v4();
/// let access = ProjectAccess::new(owner, vec![member]);
///
/// assert!(decide(member, &access, Action::CreateTask).is_ok());
/// assert!(decide(member, &access, Action::DeleteProject).is_err());
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{membership::Membership, project::Project};

/// A denied authorization decision, carrying the reason shown to the client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct AccessDenied(pub &'static str);

/// Snapshot of a project's effective membership at decision time
///
/// Loaded fresh for every access check; never cached across requests. The
/// effective member set is {owner} ∪ {explicit membership rows}.
#[derive(Debug, Clone)]
pub struct ProjectAccess {
    owner_id: Uuid,
    member_ids: Vec<Uuid>,
}

impl ProjectAccess {
    /// Builds a snapshot from an owner and the explicit member IDs
    pub fn new(owner_id: Uuid, member_ids: Vec<Uuid>) -> Self {
        Self {
            owner_id,
            member_ids,
        }
    }

    /// Loads the snapshot for a project from the membership ledger
    pub async fn load(pool: &PgPool, project: &Project) -> Result<Self, sqlx::Error> {
        let member_ids = Membership::member_ids(pool, project.id).await?;
        Ok(Self::new(project.owner_id, member_ids))
    }

    /// The project's owner
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Checks whether the user is the project owner
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Checks whether the user is an effective member of the project
    ///
    /// Unions the derived owner check with the explicit-row lookup; this is
    /// the only place that union is expressed.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.is_owner(user_id) || self.member_ids.contains(&user_id)
    }

    /// Checks whether the user has an explicit membership row
    ///
    /// Unlike [`is_participant`](Self::is_participant), this excludes the
    /// owner. Used by the invite flow's already-a-member precondition.
    pub fn is_listed_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }
}

/// Every operation governed by the decision procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read a project's detail
    ViewProject,

    /// Rename a project
    UpdateProject,

    /// Delete a project (cascades memberships and tasks)
    DeleteProject,

    /// Invite a user into a project
    InviteMember,

    /// Remove a member from a project
    RemoveMember,

    /// List a project's tasks
    ViewTasks,

    /// Read a single task
    ViewTask,

    /// Create a task in a project
    CreateTask,

    /// Update a task
    UpdateTask,

    /// Delete a task
    DeleteTask,
}

impl Action {
    /// Whether this action is restricted to the project owner
    fn owner_only(&self) -> bool {
        matches!(
            self,
            Action::UpdateProject
                | Action::DeleteProject
                | Action::InviteMember
                | Action::RemoveMember
        )
    }

    /// The reason string returned when this action is denied
    fn denial_reason(&self) -> &'static str {
        match self {
            Action::ViewProject => "You are not authorized to access this project",
            Action::UpdateProject => "Only the owner can update the project",
            Action::DeleteProject => "Only the owner can delete the project",
            Action::InviteMember => "Only owner can invite members",
            Action::RemoveMember => "Only the project owner can remove members",
            Action::ViewTasks => "Not authorized to access tasks",
            Action::ViewTask => "Not authorized to access this task",
            Action::CreateTask => "Not allowed to add task to this project",
            Action::UpdateTask => "Not allowed to update this task",
            Action::DeleteTask => "Not allowed to delete this task",
        }
    }
}

/// The authorization decision procedure
///
/// Pure function of its inputs: no state mutation, no I/O. Callers load
/// the project and its membership snapshot first, then ask for a verdict.
///
/// Owner-only actions (project mutation, membership administration) allow
/// only the owner; everything else allows any participant.
pub fn decide(actor: Uuid, access: &ProjectAccess, action: Action) -> Result<(), AccessDenied> {
    let allowed = if action.owner_only() {
        access.is_owner(actor)
    } else {
        access.is_participant(actor)
    };

    if allowed {
        Ok(())
    } else {
        Err(AccessDenied(action.denial_reason()))
    }
}

/// The assignment validator
///
/// A task's assignee, when set, must be an effective member of the task's
/// project at the time of assignment. `None` is always valid (the task is
/// unassigned).
pub fn validate_assignee(
    access: &ProjectAccess,
    assignee_id: Option<Uuid>,
) -> Result<(), AccessDenied> {
    match assignee_id {
        None => Ok(()),
        Some(id) if access.is_participant(id) => Ok(()),
        Some(_) => Err(AccessDenied("Assignee must be a project member")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Uuid, Uuid, Uuid, ProjectAccess) {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let access = ProjectAccess::new(owner, vec![member]);
        (owner, member, outsider, access)
    }

    #[test]
    fn test_participant_predicate_unions_owner_and_members() {
        let (owner, member, outsider, access) = fixture();

        assert!(access.is_participant(owner));
        assert!(access.is_participant(member));
        assert!(!access.is_participant(outsider));

        // The owner is a participant but never a listed member
        assert!(!access.is_listed_member(owner));
        assert!(access.is_listed_member(member));
    }

    #[test]
    fn test_read_allows_owner_and_member_only() {
        let (owner, member, outsider, access) = fixture();

        for action in [Action::ViewProject, Action::ViewTasks, Action::ViewTask] {
            assert!(decide(owner, &access, action).is_ok());
            assert!(decide(member, &access, action).is_ok());
            assert!(decide(outsider, &access, action).is_err());
        }
    }

    #[test]
    fn test_project_mutation_is_owner_only() {
        let (owner, member, outsider, access) = fixture();

        for action in [Action::UpdateProject, Action::DeleteProject] {
            assert!(decide(owner, &access, action).is_ok());
            assert!(decide(member, &access, action).is_err());
            assert!(decide(outsider, &access, action).is_err());
        }

        assert_eq!(
            decide(member, &access, Action::UpdateProject).unwrap_err(),
            AccessDenied("Only the owner can update the project")
        );
    }

    #[test]
    fn test_membership_administration_is_owner_only() {
        let (owner, member, _, access) = fixture();

        assert!(decide(owner, &access, Action::InviteMember).is_ok());
        assert!(decide(owner, &access, Action::RemoveMember).is_ok());
        assert!(decide(member, &access, Action::InviteMember).is_err());
        assert!(decide(member, &access, Action::RemoveMember).is_err());
    }

    #[test]
    fn test_task_access_is_symmetric_with_read() {
        let (owner, member, outsider, access) = fixture();

        for action in [
            Action::CreateTask,
            Action::UpdateTask,
            Action::DeleteTask,
            Action::ViewTask,
        ] {
            assert_eq!(
                decide(owner, &access, action).is_ok(),
                decide(owner, &access, Action::ViewTask).is_ok()
            );
            assert_eq!(
                decide(member, &access, action).is_ok(),
                decide(member, &access, Action::ViewTask).is_ok()
            );
            assert_eq!(
                decide(outsider, &access, action).is_ok(),
                decide(outsider, &access, Action::ViewTask).is_ok()
            );
        }
    }

    #[test]
    fn test_decide_is_pure_over_repeated_calls() {
        let (_, member, _, access) = fixture();

        let first = decide(member, &access, Action::CreateTask);
        let second = decide(member, &access, Action::CreateTask);
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_assignee_accepts_unassigned() {
        let (_, _, _, access) = fixture();
        assert!(validate_assignee(&access, None).is_ok());
    }

    #[test]
    fn test_validate_assignee_accepts_owner_and_member() {
        let (owner, member, _, access) = fixture();
        assert!(validate_assignee(&access, Some(owner)).is_ok());
        assert!(validate_assignee(&access, Some(member)).is_ok());
    }

    #[test]
    fn test_validate_assignee_rejects_outsider() {
        let (_, _, outsider, access) = fixture();
        assert_eq!(
            validate_assignee(&access, Some(outsider)).unwrap_err(),
            AccessDenied("Assignee must be a project member")
        );
    }
}
