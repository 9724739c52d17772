use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::middleware::{auth_middleware, metrics_middleware};
use super::{handlers, tasks};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes (authenticated)
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::get_status))
        .route("/process-video", post(tasks::process_video))
        .route("/tasks/{id}", get(tasks::get_task))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Task directories as static files
    let files_route = state
        .config()
        .server
        .files_route
        .trim_end_matches('/')
        .to_string();
    let files = ServeDir::new(&state.config().storage.root_dir);

    Router::new()
        .route("/", get(handlers::root))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .nest("/api", api_routes)
        .nest_service(&files_route, files)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(metrics_middleware)),
        )
}
