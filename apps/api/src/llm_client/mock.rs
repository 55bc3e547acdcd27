//! Scripted `CompletionProvider` for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionProvider, LlmError};

/// Replays queued responses in order and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reply is delayed by `delay` before being returned.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_ok(&self, text: impl Into<String>) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn push_err(&self, err: LlmError) -> &Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

/// A well-formed analysis reply with the given overall score.
pub fn analysis_json(overall_score: u32) -> String {
    serde_json::json!({
        "candidate_name": "Jane Doe",
        "skills": ["Python", "FastAPI", "PostgreSQL"],
        "experience": "5 years backend development",
        "education": "BSc Computer Science",
        "projects": ["Payments API"],
        "skill_match": 85,
        "experience_match": 80,
        "project_relevance": 75,
        "education_match": 70,
        "overall_score": overall_score,
        "strengths": ["Strong Python background"],
        "gaps": ["No Kubernetes experience"],
        "summary": "Solid backend engineer for the role."
    })
    .to_string()
}

/// A JSON array of `n` distinct questions.
pub fn questions_json(n: usize) -> String {
    let questions: Vec<String> = (0..n)
        .map(|i| format!("Question {i}: describe a backend system you built?"))
        .collect();
    serde_json::to_string(&questions).unwrap()
}

pub fn evaluation_json(score: u32) -> String {
    serde_json::json!({
        "score": score,
        "feedback": "Clear and structured answer.",
        "strengths": "Concrete examples",
        "improvements": "Mention trade-offs"
    })
    .to_string()
}
