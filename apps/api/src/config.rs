use anyhow::{Context, Result};

use crate::ai::model_pool::Feature;
use crate::ai::AiSettings;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub ai_requests_per_minute: u32,
    pub ai_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            ai_requests_per_minute: parse_env("AI_REQUESTS_PER_MINUTE", 50)?,
            ai_max_attempts: parse_env("AI_MAX_ATTEMPTS", 3)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Settings handed to the AI service. Per-feature model overrides come
    /// from `GEMINI_MODEL_<FEATURE>` variables (e.g. `GEMINI_MODEL_QUIZ`).
    pub fn ai_settings(&self) -> AiSettings {
        let model_overrides = Feature::ALL
            .iter()
            .filter_map(|&feature| {
                let key = format!("GEMINI_MODEL_{}", feature.as_str().to_uppercase());
                std::env::var(key).ok().map(|model| (feature, model))
            })
            .collect();

        AiSettings {
            default_model: self.gemini_model.clone(),
            model_overrides,
            max_requests_per_minute: self.ai_requests_per_minute,
            max_attempts: self.ai_max_attempts,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}
