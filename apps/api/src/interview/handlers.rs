//! Axum route handlers for the interview workflow.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{ResumeAnalysis, SessionSnapshot, SubmitOutcome};
use crate::routes::extract::{parse_session_id, AppJson};
use crate::state::AppState;
use crate::upload::{extract_text, is_pdf, persist_upload, preview, PREVIEW_CHARS};

const SUCCESS: &str = "success";
/// Multipart field carrying the resume.
const FILE_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub session_id: Uuid,
    pub preview: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub session_id: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub analysis: ResumeAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub status: &'static str,
    pub questions: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub session_id: String,
    /// Signed so a negative index is reported as a bad index, not a bad body.
    pub question_index: i64,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
    pub message: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /upload
///
/// Multipart PDF upload. Persists the file, extracts its text and opens a session.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    let max_bytes = state.config.max_upload_bytes;

    let mut data = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if !is_pdf(field.content_type(), field.file_name()) {
            return Err(AppError::InvalidInput(
                "Only PDF files are allowed.".to_string(),
            ));
        }
        let bytes = field.bytes().await?;
        if bytes.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {max_bytes} bytes."
            )));
        }
        data = Some(bytes);
        break;
    }

    let data = data.ok_or_else(|| {
        AppError::InvalidInput(format!("Missing multipart field '{FILE_FIELD}'"))
    })?;
    if data.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty.".to_string()));
    }

    // Dropped, and so deleted, on any failure below.
    let upload = persist_upload(state.config.upload_dir.clone(), data.clone()).await?;
    let resume_text = extract_text(state.extractor.clone(), data).await?;
    let preview = preview(&resume_text, PREVIEW_CHARS);

    let session_id = state
        .sessions
        .create_session(resume_text, Some(upload))
        .await?;

    Ok(Json(UploadResponse {
        status: SUCCESS,
        session_id,
        preview,
    }))
}

/// POST /analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let id = parse_session_id(&request.session_id)?;
    let analysis = state
        .sessions
        .analyze(id, &request.job_description)
        .await?;

    Ok(Json(AnalyzeResponse {
        status: SUCCESS,
        analysis,
    }))
}

/// POST /start_interview
pub async fn handle_start_interview(
    State(state): State<AppState>,
    AppJson(request): AppJson<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let id = parse_session_id(&request.session_id)?;
    let questions = state.sessions.start_interview(id).await?;

    Ok(Json(StartInterviewResponse {
        status: SUCCESS,
        total: questions.len(),
        questions,
    }))
}

/// POST /submit_answer
///
/// Returns the evaluation, plus the final score once the last question is answered.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    AppJson(request): AppJson<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let id = parse_session_id(&request.session_id)?;
    let question_index = usize::try_from(request.question_index).map_err(|_| {
        AppError::InvalidInput(format!(
            "Invalid question index {}",
            request.question_index
        ))
    })?;

    let outcome = state
        .sessions
        .submit_answer(id, question_index, &request.answer)
        .await?;

    Ok(Json(SubmitAnswerResponse {
        status: SUCCESS,
        outcome,
    }))
}

/// GET /session/:session_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_session_id(&session_id)?;
    let session = state.sessions.get_session(id).await?;

    Ok(Json(SessionResponse {
        status: SUCCESS,
        session,
    }))
}

/// DELETE /session/:session_id
///
/// Idempotent: unknown or malformed ids still succeed.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<DeleteResponse> {
    if let Ok(id) = parse_session_id(&session_id) {
        state.sessions.delete_session(id).await;
    }

    Json(DeleteResponse {
        status: SUCCESS,
        message: "Session deleted",
    })
}
