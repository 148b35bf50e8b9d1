//! Cover Letter — generates a role-specific letter in markdown.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::ai::error::AiError;
use crate::ai::model_pool::Feature;
use crate::ai::{AiService, GenerationRequest};
use crate::errors::AppError;
use crate::features::prompts;

/// Normalized cover letter: `content` is always a non-empty markdown string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetterText {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverLetterInput {
    pub candidate_name: String,
    pub job_title: String,
    pub company_name: String,
    pub job_description: String,
    /// Free-text background: experience summary, key skills.
    pub background: String,
}

/// Runs the cover-letter pipeline. There is no fallback letter — a generic
/// letter with the wrong name on it is worse than an error — so failure
/// surfaces as the feature-named error.
pub async fn generate_cover_letter(
    ai: &AiService,
    input: &CoverLetterInput,
) -> Result<CoverLetterText, AppError> {
    if input.job_title.trim().is_empty() || input.company_name.trim().is_empty() {
        return Err(AppError::Validation(
            "job_title and company_name are required".to_string(),
        ));
    }

    let prompt = prompts::cover_letter_prompt(
        &input.candidate_name,
        &input.job_title,
        &input.company_name,
        &input.job_description,
        &input.background,
    );
    let request = GenerationRequest::new(Feature::CoverLetter, prompt);

    let letter = ai
        .generate_json(&request)
        .await
        .and_then(|v| normalize_cover_letter(&v))
        .map_err(|e| {
            warn!("Cover letter generation failed: {e}");
            AppError::Llm("Failed to generate cover letter".to_string())
        })?;

    info!(
        "Generated cover letter for {} at {} ({} chars)",
        input.job_title,
        input.company_name,
        letter.content.len()
    );
    Ok(letter)
}

/// A missing or empty `content` field has no sensible default.
pub fn normalize_cover_letter(value: &Value) -> Result<CoverLetterText, AiError> {
    match value.get("content").and_then(Value::as_str) {
        Some(content) if !content.trim().is_empty() => Ok(CoverLetterText {
            content: content.trim().to_string(),
        }),
        _ => Err(AiError::ValidationFailed(
            "cover letter content missing or empty".to_string(),
        )),
    }
}
