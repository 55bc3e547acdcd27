use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Workflow stage. Ordering follows the workflow, so `a < b` means `a` comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Created,
    Analyzed,
    InterviewStarted,
    Completed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Created => "created",
            Stage::Analyzed => "analyzed",
            Stage::InterviewStarted => "interview_started",
            Stage::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Structured resume-vs-JD evaluation returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResumeAnalysis {
    pub candidate_name: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
    pub projects: Vec<String>,
    pub skill_match: u32,
    pub experience_match: u32,
    pub project_relevance: u32,
    pub education_match: u32,
    /// Relevance score, 0 – 100.
    pub overall_score: u32,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub summary: String,
}

/// Model feedback for one interview answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Evaluation {
    /// 0 – 100
    pub score: u32,
    pub feedback: String,
    pub strengths: String,
    pub improvements: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub question: String,
    pub answer: String,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Yes")]
    StrongYes,
    #[serde(rename = "Yes")]
    Yes,
    #[serde(rename = "Maybe")]
    Maybe,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalScore {
    pub resume_score: f64,
    pub interview_score: f64,
    pub final_score: f64,
    pub recommendation: Recommendation,
    pub summary: String,
}

/// Server-side record of one resume-to-interview workflow.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub stage: Stage,
    pub resume_text: String,
    pub job_description: Option<String>,
    pub analysis: Option<ResumeAnalysis>,
    pub questions: Option<Vec<String>>,
    pub answers: Vec<AnswerRecord>,
    pub final_score: Option<FinalScore>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Uploaded PDF. Dropping it deletes the file from disk.
    pub upload: Option<NamedTempFile>,
}

impl Session {
    pub fn new(resume_text: String, upload: Option<NamedTempFile>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Created,
            resume_text,
            job_description: None,
            analysis: None,
            questions: None,
            answers: Vec::new(),
            final_score: None,
            created_at: now,
            last_activity: now,
            upload,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_answered(&self, question_index: usize) -> bool {
        self.answers
            .iter()
            .any(|a| a.question_index == question_index)
    }

    /// Deletes the uploaded file now instead of waiting for the last handle to drop.
    pub fn release_upload(&mut self) {
        if let Some(file) = self.upload.take() {
            if let Err(e) = file.close() {
                tracing::warn!("Failed to remove upload for session {}: {e}", self.id);
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            stage: self.stage,
            has_analysis: self.analysis.is_some(),
            interview_progress: self.answers.len(),
            total_questions: self.questions.as_ref().map_or(0, Vec::len),
            job_description: self.job_description.clone(),
            analysis: self.analysis.clone(),
            questions: self.questions.clone().unwrap_or_default(),
            answers: self.answers.clone(),
            final_score: self.final_score.clone(),
            created_at: self.created_at,
            last_activity: self.last_activity,
        }
    }
}

/// Read-only view of a session returned by `GET /session/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub stage: Stage,
    pub has_analysis: bool,
    pub interview_progress: usize,
    pub total_questions: usize,
    pub job_description: Option<String>,
    pub analysis: Option<ResumeAnalysis>,
    pub questions: Vec<String>,
    pub answers: Vec<AnswerRecord>,
    pub final_score: Option<FinalScore>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Outcome of a successful `submit_answer`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub evaluation: Evaluation,
    pub question_index: usize,
    pub is_complete: bool,
    pub final_score: Option<FinalScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_follows_workflow() {
        assert!(Stage::Created < Stage::Analyzed);
        assert!(Stage::Analyzed < Stage::InterviewStarted);
        assert!(Stage::InterviewStarted < Stage::Completed);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::InterviewStarted).unwrap();
        assert_eq!(json, r#""interview_started""#);
        assert_eq!(Stage::InterviewStarted.to_string(), "interview_started");
    }

    #[test]
    fn test_recommendation_serializes_human_labels() {
        assert_eq!(
            serde_json::to_string(&Recommendation::StrongYes).unwrap(),
            r#""Strong Yes""#
        );
        assert_eq!(
            serde_json::to_string(&Recommendation::Maybe).unwrap(),
            r#""Maybe""#
        );
    }

    #[test]
    fn test_new_session_starts_created_and_empty() {
        let session = Session::new("resume".to_string(), None);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.stage, Stage::Created);
        assert!(!snapshot.has_analysis);
        assert_eq!(snapshot.interview_progress, 0);
        assert_eq!(snapshot.total_questions, 0);
        assert!(snapshot.final_score.is_none());
    }

    #[test]
    fn test_release_upload_removes_file() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let mut session = Session::new("resume".to_string(), Some(file));
        assert!(path.exists());

        session.release_upload();
        assert!(!path.exists());
        assert!(session.upload.is_none());
    }
}
