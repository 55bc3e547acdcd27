use axum::{extract::State, response::Html};
use tracing::debug;

use crate::state::AppState;

const FALLBACK_PAGE: &str = r#"<!doctype html>
<html>
<head><title>AURA Backend</title></head>
<body>
  <h1>AURA Backend Active</h1>
  <p>No frontend build found. Copy the frontend build into the static directory.</p>
  <p>API health: <a href="/health">/health</a></p>
</body>
</html>
"#;

/// GET /
/// Serves `STATIC_DIR/index.html`, or a status page when no build is present.
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let index = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html),
        Err(e) => {
            debug!("No frontend at {}: {e}", index.display());
            Html(FALLBACK_PAGE.to_string())
        }
    }
}
