//! Strict parsers for model output.
//!
//! Only a surrounding markdown code fence is tolerated. Prose around the JSON,
//! truncation, missing or misnamed keys, wrong types and out-of-range scores
//! are all rejected. Nothing is defaulted.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::interview::models::{Evaluation, ResumeAnalysis};
use crate::llm_client::strip_json_fences;

pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON for the expected schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field '{field}' must be between 0 and {MAX_SCORE}, got {value}")]
    ScoreOutOfRange { field: &'static str, value: u32 },

    #[error("field '{0}' must not be empty")]
    Empty(&'static str),

    #[error("expected {expected} questions, got {got}")]
    TooFewQuestions { expected: usize, got: usize },
}

fn parse_strict<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    Ok(serde_json::from_str(strip_json_fences(raw))?)
}

fn check_score(field: &'static str, value: u32) -> Result<(), ParseError> {
    if value > MAX_SCORE {
        return Err(ParseError::ScoreOutOfRange { field, value });
    }
    Ok(())
}

pub fn parse_analysis(raw: &str) -> Result<ResumeAnalysis, ParseError> {
    let analysis: ResumeAnalysis = parse_strict(raw)?;

    check_score("skill_match", analysis.skill_match)?;
    check_score("experience_match", analysis.experience_match)?;
    check_score("project_relevance", analysis.project_relevance)?;
    check_score("education_match", analysis.education_match)?;
    check_score("overall_score", analysis.overall_score)?;

    if analysis.summary.trim().is_empty() {
        return Err(ParseError::Empty("summary"));
    }
    Ok(analysis)
}

/// Parses a JSON array of questions and keeps the first `count`.
///
/// Blank entries are dropped before counting; fewer than `count` usable
/// questions is an error.
pub fn parse_questions(raw: &str, count: usize) -> Result<Vec<String>, ParseError> {
    let questions: Vec<String> = parse_strict(raw)?;
    let mut usable: Vec<String> = questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    if usable.len() < count {
        return Err(ParseError::TooFewQuestions {
            expected: count,
            got: usable.len(),
        });
    }
    usable.truncate(count);
    Ok(usable)
}

pub fn parse_evaluation(raw: &str) -> Result<Evaluation, ParseError> {
    let evaluation: Evaluation = parse_strict(raw)?;
    check_score("score", evaluation.score)?;
    if evaluation.feedback.trim().is_empty() {
        return Err(ParseError::Empty("feedback"));
    }
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock::{analysis_json, evaluation_json, questions_json};

    #[test]
    fn test_analysis_well_formed() {
        let analysis = parse_analysis(&analysis_json(82)).unwrap();
        assert_eq!(analysis.overall_score, 82);
        assert_eq!(analysis.candidate_name, "Jane Doe");
        assert_eq!(analysis.gaps, vec!["No Kubernetes experience"]);
    }

    #[test]
    fn test_analysis_inside_code_fence() {
        let raw = format!("```json\n{}\n```", analysis_json(70));
        assert_eq!(parse_analysis(&raw).unwrap().overall_score, 70);
    }

    #[test]
    fn test_analysis_with_leading_prose_is_rejected() {
        let raw = format!("Here is the analysis you asked for:\n{}", analysis_json(70));
        assert!(matches!(parse_analysis(&raw), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_analysis_truncated_is_rejected() {
        let full = analysis_json(70);
        let truncated = &full[..full.len() / 2];
        assert!(matches!(parse_analysis(truncated), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_analysis_with_camel_case_keys_is_rejected() {
        let raw = r#"{"name": "Jane", "skills": [], "overallScore": 80}"#;
        assert!(matches!(parse_analysis(raw), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_analysis_score_above_100_is_rejected() {
        let err = parse_analysis(&analysis_json(140)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ScoreOutOfRange {
                field: "overall_score",
                value: 140
            }
        ));
    }

    #[test]
    fn test_analysis_negative_score_is_rejected() {
        let raw = analysis_json(50).replace("\"overall_score\":50", "\"overall_score\":-5");
        assert!(parse_analysis(&raw).is_err());
    }

    #[test]
    fn test_analysis_score_as_string_is_rejected() {
        let raw = analysis_json(50).replace("\"overall_score\":50", "\"overall_score\":\"50\"");
        assert!(matches!(parse_analysis(&raw), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_questions_exact_count() {
        let questions = parse_questions(&questions_json(5), 5).unwrap();
        assert_eq!(questions.len(), 5);
    }

    #[test]
    fn test_questions_extra_are_truncated() {
        let questions = parse_questions(&questions_json(7), 5).unwrap();
        assert_eq!(questions.len(), 5);
        assert!(questions[0].starts_with("Question 0"));
    }

    #[test]
    fn test_questions_too_few_is_rejected() {
        let err = parse_questions(&questions_json(3), 5).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TooFewQuestions {
                expected: 5,
                got: 3
            }
        ));
    }

    #[test]
    fn test_questions_blank_entries_do_not_count() {
        let raw = r#"["What is Rust?", "   ", "Explain ownership."]"#;
        let err = parse_questions(raw, 3).unwrap_err();
        assert!(matches!(err, ParseError::TooFewQuestions { got: 2, .. }));
    }

    #[test]
    fn test_questions_object_instead_of_array_is_rejected() {
        let raw = r#"{"questions": ["a", "b"]}"#;
        assert!(matches!(parse_questions(raw, 2), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_evaluation_well_formed() {
        let evaluation = parse_evaluation(&evaluation_json(77)).unwrap();
        assert_eq!(evaluation.score, 77);
        assert_eq!(evaluation.improvements, "Mention trade-offs");
    }

    #[test]
    fn test_evaluation_missing_feedback_is_rejected() {
        let raw = r#"{"score": 80, "strengths": "x", "improvements": "y"}"#;
        assert!(matches!(parse_evaluation(raw), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_evaluation_blank_feedback_is_rejected() {
        let raw = r#"{"score": 80, "feedback": " ", "strengths": "x", "improvements": "y"}"#;
        assert!(matches!(
            parse_evaluation(raw),
            Err(ParseError::Empty("feedback"))
        ));
    }

    #[test]
    fn test_evaluation_with_unexpected_key_is_rejected() {
        let raw = r#"{"score": 80, "feedback": "ok", "strengths": "x", "improvements": "y", "grade": "B"}"#;
        assert!(matches!(parse_evaluation(raw), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_analysis_with_unexpected_key_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(&analysis_json(80)).unwrap();
        value["confidence"] = serde_json::json!(0.9);
        assert!(matches!(
            parse_analysis(&value.to_string()),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_evaluation_not_json_is_rejected() {
        assert!(parse_evaluation("I would rate this answer 8/10.").is_err());
    }
}
