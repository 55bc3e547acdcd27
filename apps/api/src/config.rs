use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_MODEL;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Number of interview questions generated per session.
    pub question_count: usize,
    /// Weight of the resume relevance score in the final score. The interview
    /// mean gets `1.0 - resume_score_weight`.
    pub resume_score_weight: f64,
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
    pub max_sessions: usize,
    pub max_upload_bytes: usize,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 8000)?,
            rust_log: env_or("RUST_LOG", "info"),
            question_count: parse_env("QUESTION_COUNT", 5)?,
            resume_score_weight: parse_env("RESUME_SCORE_WEIGHT", 0.5)?,
            session_ttl: Duration::from_secs(parse_env("SESSION_TTL_SECS", 3600)?),
            sweep_interval: Duration::from_secs(parse_env("SESSION_SWEEP_INTERVAL_SECS", 60)?),
            max_sessions: parse_env("MAX_SESSIONS", 1000)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 8 * 1024 * 1024)?,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "data")),
            static_dir: PathBuf::from(env_or("STATIC_DIR", "static")),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.resume_score_weight) {
            bail!(
                "RESUME_SCORE_WEIGHT must be between 0 and 1, got {}",
                self.resume_score_weight
            );
        }
        if self.question_count == 0 {
            bail!("QUESTION_COUNT must be at least 1");
        }
        if self.max_sessions == 0 {
            bail!("MAX_SESSIONS must be at least 1");
        }
        if self.sweep_interval.is_zero() {
            bail!("SESSION_SWEEP_INTERVAL_SECS must be at least 1");
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        anthropic_api_key: "test-key".to_string(),
        llm_model: DEFAULT_MODEL.to_string(),
        llm_timeout: Duration::from_secs(5),
        host: "127.0.0.1".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        question_count: 3,
        resume_score_weight: 0.5,
        session_ttl: Duration::from_secs(3600),
        sweep_interval: Duration::from_secs(60),
        max_sessions: 100,
        max_upload_bytes: 1024,
        upload_dir: std::env::temp_dir(),
        static_dir: PathBuf::from("does-not-exist"),
    }
}
