/// Integration tests for the CrewDesk API
///
/// These tests verify the authorization and membership-consistency core
/// end-to-end over the HTTP surface:
/// - Authentication requirement and identity resolution
/// - Project lifecycle and per-owner name uniqueness
/// - The invite/remove membership scenario, including idempotent removal
/// - Access symmetry for tasks and assignment soundness
/// - Cascade deletion of memberships and tasks
///
/// They require a running PostgreSQL database (see tests/common/mod.rs).

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;

/// Requests without a credential are rejected with 401
#[tokio::test]
async fn test_authentication_required() {
    let mut ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.call("GET", "/api/v1/projects", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["statusCode"], 401);
    assert_eq!(body["message"], "No token provided");

    ctx.cleanup().await.unwrap();
}

/// Register → login round trip through the public auth endpoints
#[tokio::test]
async fn test_register_and_login() {
    let mut ctx = TestContext::new().await.unwrap();

    let email = format!("auth-{}@example.com", uuid::Uuid::new_v4());
    let (status, body) = ctx
        .call(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"email": email, "password": "secret123"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered successfully");
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["user"]["email"], email.as_str());

    // Duplicate registration is a policy denial
    let (status, body) = ctx
        .call(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"email": email, "password": "secret123"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");

    let (status, body) = ctx
        .call(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": email, "password": "secret123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");

    let (status, body) = ctx
        .call(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": email, "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials");

    // Clean up the user created through the API
    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// The §8 membership scenario: invite succeeds once, removal is never
/// silently idempotent
#[tokio::test]
async fn test_invite_and_remove_scenario() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_owner, owner_token) = ctx.create_user("owner").await.unwrap();
    let (invitee, _) = ctx.create_user("invitee").await.unwrap();

    // Owner creates "Roadmap"
    let (status, body) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Roadmap"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    // Inviting B succeeds
    let invite_uri = format!("/api/v1/projects/{}/invite", project_id);
    let (status, body) = ctx
        .call(
            "POST",
            &invite_uri,
            Some(&owner_token),
            Some(json!({"email": invitee.email})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Member invited successfully");

    // Inviting B again fails
    let (status, body) = ctx
        .call(
            "POST",
            &invite_uri,
            Some(&owner_token),
            Some(json!({"email": invitee.email})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already a member");

    // Removing B succeeds
    let remove_uri = format!("/api/v1/projects/{}/members/{}", project_id, invitee.id);
    let (status, _) = ctx.call("DELETE", &remove_uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Removing B again is NotFound, never a silent success
    let (status, body) = ctx.call("DELETE", &remove_uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Member not found in this project");

    ctx.cleanup().await.unwrap();
}

/// Invite preconditions: unknown email is 404, self-invite and owner
/// removal are denied
#[tokio::test]
async fn test_invite_preconditions() {
    let mut ctx = TestContext::new().await.unwrap();
    let (owner, owner_token) = ctx.create_user("owner").await.unwrap();

    let (_, body) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Precondition checks"})),
        )
        .await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();
    let invite_uri = format!("/api/v1/projects/{}/invite", project_id);

    // Unknown email resolves cleanly to 404 — it is never dereferenced first
    let (status, body) = ctx
        .call(
            "POST",
            &invite_uri,
            Some(&owner_token),
            Some(json!({"email": "nobody-here@example.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    // Self-invite is denied
    let (status, body) = ctx
        .call(
            "POST",
            &invite_uri,
            Some(&owner_token),
            Some(json!({"email": owner.email})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot invite yourself");

    // The owner can never be removed
    let remove_uri = format!("/api/v1/projects/{}/members/{}", project_id, owner.id);
    let (status, body) = ctx.call("DELETE", &remove_uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Owner cannot be removed from the project");

    ctx.cleanup().await.unwrap();
}

/// Members can read but never mutate project metadata or administer the
/// ledger; outsiders can do neither
#[tokio::test]
async fn test_project_authorization_boundaries() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_owner, owner_token) = ctx.create_user("owner").await.unwrap();
    let (member, member_token) = ctx.create_user("member").await.unwrap();
    let (_outsider, outsider_token) = ctx.create_user("outsider").await.unwrap();

    let (_, body) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Roadmap"})),
        )
        .await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();
    let project_uri = format!("/api/v1/projects/{}", project_id);

    ctx.call(
        "POST",
        &format!("/api/v1/projects/{}/invite", project_id),
        Some(&owner_token),
        Some(json!({"email": member.email})),
    )
    .await;

    // Member can read
    let (status, _) = ctx.call("GET", &project_uri, Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Outsider cannot
    let (status, body) = ctx
        .call("GET", &project_uri, Some(&outsider_token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You are not authorized to access this project");

    // Member attempts rename → denied with the owner-only reason
    let (status, body) = ctx
        .call(
            "PUT",
            &project_uri,
            Some(&member_token),
            Some(json!({"name": "Renamed"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only the owner can update the project");

    // Member cannot invite or remove
    let (status, _) = ctx
        .call(
            "POST",
            &format!("/api/v1/projects/{}/invite", project_id),
            Some(&member_token),
            Some(json!({"email": member.email})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Member never appears as owner: the members list excludes the owner
    let (_, body) = ctx.call("GET", &project_uri, Some(&owner_token), None).await;
    let members = body["data"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["userId"], member.id.to_string());

    ctx.cleanup().await.unwrap();
}

/// Per-owner name uniqueness on create and rename; different owners may
/// reuse a name
#[tokio::test]
async fn test_project_name_uniqueness() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_a, a_token) = ctx.create_user("owner-a").await.unwrap();
    let (_b, b_token) = ctx.create_user("owner-b").await.unwrap();

    let (status, _) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&a_token),
            Some(json!({"name": "Unique name"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same owner, same name → denied
    let (status, body) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&a_token),
            Some(json!({"name": "Unique name"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Project with this name already exists");

    // Different owner, same name → fine
    let (status, _) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&b_token),
            Some(json!({"name": "Unique name"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Rename excludes the row being renamed: a no-op rename succeeds
    let (_, body) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&a_token),
            Some(json!({"name": "Other"})),
        )
        .await;
    let other_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .call(
            "PUT",
            &format!("/api/v1/projects/{}", other_id),
            Some(&a_token),
            Some(json!({"name": "Unique name"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Project with this name already exists");

    ctx.cleanup().await.unwrap();
}

/// Assignment soundness: an assignee must be the owner or a member at the
/// time of assignment
#[tokio::test]
async fn test_task_assignment_soundness() {
    let mut ctx = TestContext::new().await.unwrap();
    let (owner, owner_token) = ctx.create_user("owner").await.unwrap();
    let (member, _) = ctx.create_user("member").await.unwrap();
    let (outsider, _) = ctx.create_user("outsider").await.unwrap();

    let (_, body) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Roadmap"})),
        )
        .await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();
    let tasks_uri = format!("/api/v1/tasks/{}", project_id);

    ctx.call(
        "POST",
        &format!("/api/v1/projects/{}/invite", project_id),
        Some(&owner_token),
        Some(json!({"email": member.email})),
    )
    .await;

    // Outsider assignee → denied
    let (status, body) = ctx
        .call(
            "POST",
            &tasks_uri,
            Some(&owner_token),
            Some(json!({
                "title": "Plan the launch",
                "description": "Collect the milestones",
                "status": "todo",
                "assignee_id": outsider.id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Assignee must be a project member");

    // Owner and member are both valid assignees
    for assignee in [owner.id, member.id] {
        let (status, _) = ctx
            .call(
                "POST",
                &tasks_uri,
                Some(&owner_token),
                Some(json!({
                    "title": "Plan the launch",
                    "description": "Collect the milestones",
                    "status": "todo",
                    "assignee_id": assignee,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    ctx.cleanup().await.unwrap();
}

/// Task updates: three-way assignee semantics and access symmetry
#[tokio::test]
async fn test_task_update_semantics() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_owner, owner_token) = ctx.create_user("owner").await.unwrap();
    let (member, member_token) = ctx.create_user("member").await.unwrap();
    let (_outsider, outsider_token) = ctx.create_user("outsider").await.unwrap();

    let (_, body) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Roadmap"})),
        )
        .await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    ctx.call(
        "POST",
        &format!("/api/v1/projects/{}/invite", project_id),
        Some(&owner_token),
        Some(json!({"email": member.email})),
    )
    .await;

    let (_, body) = ctx
        .call(
            "POST",
            &format!("/api/v1/tasks/{}", project_id),
            Some(&owner_token),
            Some(json!({
                "title": "Plan the launch",
                "description": "Collect the milestones",
                "status": "todo",
                "assignee_id": member.id,
            })),
        )
        .await;
    let task_uri = format!("/api/v1/tasks/detail/{}", body["data"]["id"].as_str().unwrap());

    // A member may update tasks (access symmetric with read)
    let (status, body) = ctx
        .call(
            "PUT",
            &task_uri,
            Some(&member_token),
            Some(json!({"status": "in-progress"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in-progress");
    // Omitted assignee field stays unchanged
    assert_eq!(body["data"]["assignee"]["id"], member.id.to_string());

    // Explicit empty value clears the assignee
    let (status, body) = ctx
        .call(
            "PUT",
            &task_uri,
            Some(&member_token),
            Some(json!({"assignee_id": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["assignee"].is_null());
    assert!(body["data"]["assignee_id"].is_null());

    // Outsiders cannot touch the task
    let (status, body) = ctx
        .call(
            "PUT",
            &task_uri,
            Some(&outsider_token),
            Some(json!({"status": "done"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Not allowed to update this task");

    let (status, _) = ctx.call("DELETE", &task_uri, Some(&outsider_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// Deleting a project cascades: its tasks afterwards read as 404, not 400
#[tokio::test]
async fn test_project_delete_cascades() {
    let mut ctx = TestContext::new().await.unwrap();
    let (_owner, owner_token) = ctx.create_user("owner").await.unwrap();

    let (_, body) = ctx
        .call(
            "POST",
            "/api/v1/projects",
            Some(&owner_token),
            Some(json!({"name": "Roadmap"})),
        )
        .await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = ctx
        .call(
            "POST",
            &format!("/api/v1/tasks/{}", project_id),
            Some(&owner_token),
            Some(json!({
                "title": "Plan the launch",
                "description": "Collect the milestones",
                "status": "todo",
            })),
        )
        .await;
    let task_uri = format!("/api/v1/tasks/detail/{}", body["data"]["id"].as_str().unwrap());

    let (status, _) = ctx
        .call(
            "DELETE",
            &format!("/api/v1/projects/{}", project_id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.call("GET", &task_uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");

    ctx.cleanup().await.unwrap();
}

/// The user directory lists public identities sorted by email
#[tokio::test]
async fn test_list_users() {
    let mut ctx = TestContext::new().await.unwrap();
    let (user, token) = ctx.create_user("directory").await.unwrap();

    let (status, body) = ctx.call("GET", "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Users fetched successfully");

    let users = body["data"].as_array().unwrap();
    assert!(users
        .iter()
        .any(|u| u["email"] == user.email.as_str() && u["id"] == user.id.to_string()));
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));

    ctx.cleanup().await.unwrap();
}
