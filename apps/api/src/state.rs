use std::sync::Arc;

use crate::config::Config;
use crate::interview::manager::SessionManager;
use crate::upload::TextExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the session store; the only path to session state.
    pub sessions: Arc<SessionManager>,
    /// Pluggable text extractor. Default: `PdfTextExtractor`.
    pub extractor: Arc<dyn TextExtractor>,
    pub config: Config,
}
