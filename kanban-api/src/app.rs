/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use kanban_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let bind_address = config.bind_address();
/// let app = build_router(AppState::new(config));
///
/// let listener = tokio::net::TcpListener::bind(bind_address).await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use kanban_shared::{
    models::{task::Task, user::User},
    store::{JsonFileStore, RecordStore},
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Task collection
    pub tasks: Arc<dyn RecordStore<Task>>,

    /// User collection
    pub users: Arc<dyn RecordStore<User>>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state backed by the JSON files named in `config`
    pub fn new(config: Config) -> Self {
        let tasks = Arc::new(JsonFileStore::<Task>::json_file(&config.storage.tasks_file));
        let users = Arc::new(JsonFileStore::<User>::json_file(&config.storage.users_file));
        Self::with_stores(config, tasks, users)
    }

    /// Creates state over arbitrary stores
    pub fn with_stores(
        config: Config,
        tasks: Arc<dyn RecordStore<Task>>,
        users: Arc<dyn RecordStore<User>>,
    ) -> Self {
        Self {
            tasks,
            users,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health
/// ├── GET    /tasks
/// ├── POST   /tasks
/// ├── PATCH  /tasks/:id
/// ├── DELETE /tasks/:id
/// ├── GET    /users
/// ├── POST   /users
/// ├── PATCH  /users/:id
/// └── DELETE /users/:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            axum::routing::patch(routes::tasks::patch_task).delete(routes::tasks::delete_task),
        );

    let user_routes = Router::new()
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/users/:id",
            axum::routing::patch(routes::users::patch_user).delete(routes::users::delete_user),
        );

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(task_routes)
        .merge(user_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        // Any origin, like a development frontend on another port
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
