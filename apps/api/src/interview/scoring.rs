//! Final score policy: combines the resume relevance score with the mean interview sub-score.

use crate::interview::models::{Evaluation, FinalScore, Recommendation};

#[derive(Debug, Clone, Copy)]
pub struct ScoringPolicy {
    /// Weight of the resume score; the interview mean gets the remainder.
    pub resume_weight: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self { resume_weight: 0.5 }
    }
}

impl ScoringPolicy {
    pub fn new(resume_weight: f64) -> Self {
        Self {
            resume_weight: resume_weight.clamp(0.0, 1.0),
        }
    }

    /// Computes the final score. `evaluations` must hold one entry per question.
    pub fn final_score(&self, resume_score: u32, evaluations: &[&Evaluation]) -> FinalScore {
        let resume_score = f64::from(resume_score);
        let interview_score = if evaluations.is_empty() {
            0.0
        } else {
            evaluations.iter().map(|e| f64::from(e.score)).sum::<f64>() / evaluations.len() as f64
        };

        let combined =
            resume_score * self.resume_weight + interview_score * (1.0 - self.resume_weight);

        FinalScore {
            resume_score,
            interview_score,
            final_score: round_one_decimal(combined),
            recommendation: recommend(resume_score, interview_score),
            summary: summarize(interview_score),
        }
    }
}

fn recommend(resume_score: f64, interview_score: f64) -> Recommendation {
    if interview_score > 75.0 && resume_score > 80.0 {
        Recommendation::StrongYes
    } else if interview_score > 65.0 {
        Recommendation::Yes
    } else {
        Recommendation::Maybe
    }
}

fn summarize(interview_score: f64) -> String {
    let quality = if interview_score > 75.0 {
        "excellent"
    } else {
        "good"
    };
    format!(
        "Candidate demonstrates relevant experience for the role. Interview responses show \
         {quality} problem-solving ability and communication skills."
    )
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
