use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness probe. Always 200 while the process is serving.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "backend": "running",
        "ready": true,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
