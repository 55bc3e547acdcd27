//! Session Manager: drives the linear interview workflow.
//!
//! Flow: create_session → analyze → start_interview → submit_answer (× N) → completed.
//!
//! Model calls never hold a session lock. Each step validates the stage and
//! copies its inputs under the lock, releases it, calls the model, then
//! re-acquires the lock and re-validates before mutating. A session deleted
//! mid-call is reported as not found; a concurrent winner as an invalid stage.
//! The first handle stays alive across the call, which marks the session as
//! in use for capacity eviction and idle expiry.

use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{
    AnswerRecord, Evaluation, ResumeAnalysis, Session, SessionSnapshot, Stage, SubmitOutcome,
};
use crate::interview::parsing::{parse_analysis, parse_evaluation, parse_questions, ParseError};
use crate::interview::prompts::{
    ANALYSIS_PROMPT, ANALYSIS_SYSTEM, EVALUATION_PROMPT, EVALUATION_SYSTEM, QUESTIONS_PROMPT,
    QUESTIONS_SYSTEM,
};
use crate::interview::scoring::ScoringPolicy;
use crate::interview::store::{SessionHandle, SessionStore};
use crate::llm_client::prompts::RAW_JSON_INSTRUCTION;
use crate::llm_client::CompletionProvider;

/// Characters of a rejected model response kept in the warning log.
const LOGGED_RESPONSE_CHARS: usize = 300;

/// Tunables for the manager, taken from `Config` at startup.
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    pub question_count: usize,
    pub scoring: ScoringPolicy,
    pub llm_timeout: Duration,
    pub session_ttl: Duration,
}

pub struct SessionManager {
    store: Arc<SessionStore>,
    provider: Arc<dyn CompletionProvider>,
    settings: ManagerSettings,
}

impl SessionManager {
    pub fn new(
        store: Arc<SessionStore>,
        provider: Arc<dyn CompletionProvider>,
        settings: ManagerSettings,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    /// Allocates a session in stage `Created`. The upload, if any, is owned by
    /// the session and deleted with it.
    pub async fn create_session(
        &self,
        resume_text: String,
        upload: Option<NamedTempFile>,
    ) -> Result<Uuid, AppError> {
        if resume_text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Resume text is empty".to_string(),
            ));
        }

        let id = self.store.insert(Session::new(resume_text, upload)).await;
        info!("Created session {id}");
        Ok(id)
    }

    pub async fn analyze(
        &self,
        id: Uuid,
        job_description: &str,
    ) -> Result<ResumeAnalysis, AppError> {
        let handle = self.handle(id).await?;
        let job_description = job_description.trim();
        if job_description.is_empty() {
            return Err(AppError::InvalidInput(
                "Job description is required".to_string(),
            ));
        }

        let resume_text = {
            let mut session = handle.lock().await;
            require_stage(&session, Stage::Created, "analyze the resume")?;
            session.touch();
            session.resume_text.clone()
        };

        let prompt = ANALYSIS_PROMPT
            .replace("{job_description}", job_description)
            .replace("{resume_text}", &resume_text)
            .replace("{raw_json_instruction}", RAW_JSON_INSTRUCTION);
        let analysis = self
            .ask(&prompt, ANALYSIS_SYSTEM, "resume analysis", parse_analysis)
            .await?;

        let current = self.handle(id).await?;
        let mut session = current.lock().await;
        require_stage(&session, Stage::Created, "analyze the resume")?;
        session.job_description = Some(job_description.to_string());
        session.analysis = Some(analysis.clone());
        session.stage = Stage::Analyzed;
        session.touch();

        info!(
            "Session {id} analyzed: overall_score={}",
            analysis.overall_score
        );
        Ok(analysis)
    }

    pub async fn start_interview(&self, id: Uuid) -> Result<Vec<String>, AppError> {
        let handle = self.handle(id).await?;
        let (job_description, analysis) = {
            let mut session = handle.lock().await;
            require_stage(&session, Stage::Analyzed, "start the interview")?;
            session.touch();
            (
                session.job_description.clone().unwrap_or_default(),
                session.analysis.clone().ok_or_else(|| missing("analysis", id))?,
            )
        };

        let count = self.settings.question_count;
        let prompt = QUESTIONS_PROMPT
            .replace("{count}", &count.to_string())
            .replace("{job_description}", &job_description)
            .replace("{skills}", &join_or_none(&analysis.skills, ", "))
            .replace("{experience}", &analysis.experience)
            .replace("{gaps}", &join_or_none(&analysis.gaps, "; "))
            .replace("{raw_json_instruction}", RAW_JSON_INSTRUCTION);
        let questions = self
            .ask(&prompt, QUESTIONS_SYSTEM, "question generation", |raw| {
                parse_questions(raw, count)
            })
            .await?;

        let current = self.handle(id).await?;
        let mut session = current.lock().await;
        require_stage(&session, Stage::Analyzed, "start the interview")?;
        session.questions = Some(questions.clone());
        session.stage = Stage::InterviewStarted;
        session.touch();

        info!("Session {id} interview started with {} questions", questions.len());
        Ok(questions)
    }

    pub async fn submit_answer(
        &self,
        id: Uuid,
        question_index: usize,
        answer: &str,
    ) -> Result<SubmitOutcome, AppError> {
        let handle = self.handle(id).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(AppError::InvalidInput("Answer is required".to_string()));
        }

        let (question, job_description) = {
            let mut session = handle.lock().await;
            require_stage(&session, Stage::InterviewStarted, "submit an answer")?;
            let question = question_at(&session, question_index)?;
            session.touch();
            (question, session.job_description.clone().unwrap_or_default())
        };

        let prompt = EVALUATION_PROMPT
            .replace("{job_description}", &job_description)
            .replace("{question}", &question)
            .replace("{answer}", answer)
            .replace("{raw_json_instruction}", RAW_JSON_INSTRUCTION);
        let evaluation = self
            .ask(&prompt, EVALUATION_SYSTEM, "answer evaluation", parse_evaluation)
            .await?;

        let current = self.handle(id).await?;
        let mut session = current.lock().await;
        require_stage(&session, Stage::InterviewStarted, "submit an answer")?;
        question_at(&session, question_index)?;

        session.answers.push(AnswerRecord {
            question_index,
            question,
            answer: answer.to_string(),
            evaluation: evaluation.clone(),
        });
        session.touch();

        let total = session.questions.as_ref().map_or(0, Vec::len);
        let is_complete = session.answers.len() == total;
        if is_complete && session.final_score.is_none() {
            let resume_score = session
                .analysis
                .as_ref()
                .map(|a| a.overall_score)
                .ok_or_else(|| missing("analysis", id))?;
            let evaluations: Vec<&Evaluation> =
                session.answers.iter().map(|a| &a.evaluation).collect();
            let final_score = self.settings.scoring.final_score(resume_score, &evaluations);

            info!(
                "Session {id} completed: final_score={} recommendation={:?}",
                final_score.final_score, final_score.recommendation
            );
            session.final_score = Some(final_score);
            session.stage = Stage::Completed;
        }

        Ok(SubmitOutcome {
            evaluation,
            question_index,
            is_complete,
            final_score: session.final_score.clone(),
        })
    }

    pub async fn get_session(&self, id: Uuid) -> Result<SessionSnapshot, AppError> {
        let handle = self.handle(id).await?;
        let session = handle.lock().await;
        Ok(session.snapshot())
    }

    /// Removes the session and its upload. Deleting an absent session is not an error.
    pub async fn delete_session(&self, id: Uuid) {
        if self.store.remove(id).await {
            info!("Deleted session {id}");
        }
    }

    /// Removes sessions idle for longer than the configured TTL.
    pub async fn sweep_expired(&self) -> usize {
        let removed = self.store.remove_idle(self.settings.session_ttl).await;
        for id in &removed {
            info!("Expired idle session {id}");
        }
        debug!("{} sessions remain after sweep", self.store.len().await);
        removed.len()
    }

    /// Drops every session, deleting all uploads.
    pub async fn shutdown(&self) -> usize {
        self.store.drain().await
    }

    async fn handle(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| AppError::SessionNotFound(format!("Session {id} not found")))
    }

    /// Calls the model under the configured timeout and parses the reply.
    async fn ask<T>(
        &self,
        prompt: &str,
        system: &str,
        what: &str,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<T, AppError> {
        let raw = tokio::time::timeout(
            self.settings.llm_timeout,
            self.provider.complete(prompt, system),
        )
        .await
        .map_err(|_| {
            AppError::Upstream(format!(
                "Model provider timed out after {}s during {what}",
                self.settings.llm_timeout.as_secs_f32()
            ))
        })?
        .map_err(|e| AppError::Upstream(format!("Model provider failed during {what}: {e}")))?;

        parse(&raw).map_err(|e| {
            let preview: String = raw.chars().take(LOGGED_RESPONSE_CHARS).collect();
            warn!("Rejected model response for {what}: {e}; response starts with: {preview}");
            AppError::Upstream(format!("Model returned an unusable response for {what}: {e}"))
        })
    }
}

fn require_stage(session: &Session, expected: Stage, action: &str) -> Result<(), AppError> {
    if session.stage != expected {
        return Err(AppError::InvalidStage(format!(
            "Cannot {action}: session is '{}', expected '{expected}'",
            session.stage
        )));
    }
    Ok(())
}

/// Returns the question at `index` if it exists and has not been answered.
fn question_at(session: &Session, index: usize) -> Result<String, AppError> {
    let questions = session
        .questions
        .as_ref()
        .ok_or_else(|| missing("questions", session.id))?;
    let question = questions.get(index).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Invalid question index {index}: session has {} questions",
            questions.len()
        ))
    })?;
    if session.is_answered(index) {
        return Err(AppError::InvalidStage(format!(
            "Question {index} has already been answered"
        )));
    }
    Ok(question.clone())
}

fn missing(field: &str, id: Uuid) -> AppError {
    AppError::Internal(anyhow::anyhow!(
        "session {id} is missing {field} for its stage"
    ))
}

fn join_or_none(items: &[String], separator: &str) -> String {
    if items.is_empty() {
        "none listed".to_string()
    } else {
        items.join(separator)
    }
}
