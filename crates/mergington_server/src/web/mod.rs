//! Router assembly and shared request state.

pub mod error;
pub mod routes;

use axum::{
    http::header::{HeaderValue, CACHE_CONTROL},
    response::Redirect,
    routing::{delete, get, post},
    Router,
};
use mergington_core::{ActivityRepository, ActivityService};
use std::path::Path;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use routes::{activities, health};

/// Store handle shared by every request.
pub type SharedRepository = Arc<dyn ActivityRepository + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ActivityService<SharedRepository>>,
}

impl AppState {
    pub fn new(repo: SharedRepository) -> Self {
        Self {
            service: Arc::new(ActivityService::new(repo)),
        }
    }
}

/// Builds the full application router.
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route(
            "/",
            get(|| async { Redirect::temporary("/static/index.html") }),
        )
        .route("/health", get(health::health_handler))
        .route("/activities", get(activities::list_activities_handler))
        .route(
            "/activities/{activity_name}/signup",
            post(activities::signup_handler),
        )
        .route(
            "/activities/{activity_name}/participants/{email}",
            delete(activities::withdraw_handler),
        )
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
