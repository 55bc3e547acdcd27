//! Extractors that report failures through `AppError`.

use axum::extract::FromRequest;
use uuid::Uuid;

use crate::errors::AppError;

/// `axum::Json` with rejections mapped to `AppError::InvalidInput`, so malformed
/// bodies get the same error envelope as every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Session ids are opaque to clients; anything that is not a UUID cannot name
/// a session.
pub fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::SessionNotFound(format!("Session {raw} not found")))
}
