/// Application state and router builder
///
/// This module defines the shared application state and assembles the Axum
/// router with all routes and middleware.
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                # Health check (public)
/// └── /api/v1/                               # Versioned API
///     ├── /auth/                             # Public
///     │   ├── POST /register
///     │   └── POST /login
///     ├── /projects/                         # JWT-protected
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   ├── DELETE /:id
///     │   ├── POST   /:id/invite
///     │   └── DELETE /:id/members/:userId
///     ├── /tasks/                            # JWT-protected
///     │   ├── GET    /:projectId
///     │   ├── POST   /:projectId
///     │   ├── GET    /detail/:taskId
///     │   ├── PUT    /detail/:taskId
///     │   └── DELETE /detail/:taskId
///     └── /users/                            # JWT-protected
///         └── GET /
/// ```
///
/// # Middleware Stack
///
/// 1. Request tracing (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer, permissive like the upstream service)
/// 3. Security headers
/// 4. JWT authentication (per route group)

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use crewdesk_shared::auth::middleware::authenticate;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the pool
/// and config handles are cheap to clone. Collaborators are passed in at
/// construction — there are no global singletons.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Project routes (require JWT authentication)
    let project_routes = Router::new()
        .route("/", get(routes::projects::list_projects))
        .route("/", post(routes::projects::create_project))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", put(routes::projects::update_project))
        .route("/:id", delete(routes::projects::delete_project))
        .route("/:id/invite", post(routes::projects::invite_member))
        .route(
            "/:id/members/:user_id",
            delete(routes::projects::remove_member),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Task routes (require JWT authentication)
    let task_routes = Router::new()
        .route("/:project_id", get(routes::tasks::list_tasks))
        .route("/:project_id", post(routes::tasks::create_task))
        .route("/detail/:task_id", get(routes::tasks::get_task))
        .route("/detail/:task_id", put(routes::tasks::update_task))
        .route("/detail/:task_id", delete(routes::tasks::delete_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // User directory (require JWT authentication)
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/users", user_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Resolves the bearer credential into an `AuthContext` (token validation
/// plus user-row lookup) and injects it into request extensions. Failures
/// map to 401 through `ApiError`.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_context = authenticate(&state.db, state.jwt_secret(), auth_header).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
