pub mod extract;
pub mod frontend;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::interview::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/", get(frontend::index_handler))
        .route("/health", get(health::health_handler))
        .route("/upload", post(handlers::handle_upload))
        .route("/analyze", post(handlers::handle_analyze))
        .route("/start_interview", post(handlers::handle_start_interview))
        .route("/submit_answer", post(handlers::handle_submit_answer))
        .route(
            "/session/:session_id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
