mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router() -> Router {
    let api = Router::new()
        // Phase queues
        .route("/phases/{phase}/init", post(handlers::init_phase))
        .route("/phases/{phase}/reset", post(handlers::reset_phase))
        .route("/phases/{phase}/pop", post(handlers::pop_task))
        .route("/phases/{phase}/status", get(handlers::phase_status))
        .route("/phases/{phase}/tree", get(handlers::progress_tree))
        // Artifact registration
        .route("/artifacts/ui", post(handlers::register_ui))
        .route("/artifacts/api", post(handlers::register_api))
        .route("/artifacts/functions", post(handlers::register_function))
        // Project metadata
        .route("/metadata/section", post(handlers::metadata_section))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
