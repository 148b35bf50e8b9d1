//! Upstream generation client — the single point of entry for Gemini calls.
//!
//! ARCHITECTURAL RULE: no other module may call the generation API directly.
//! All model interactions go through `AiService`, which drives this client.
//!
//! The `TextGenerator` trait is the injection seam: orchestrator tests swap
//! in a mock backend returning canned responses, so no test touches the
//! network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::error::AiError;
use crate::ai::model_pool::ModelHandle;
use crate::ai::GenerationRequest;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Upstream request timeout. Bounds the worst case of a stalled network call
/// so total pipeline latency stays at attempts × (timeout + backoff).
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Raw upstream response. The only guaranteed extraction path is the first
/// non-empty text payload found by probing the known shapes: the nested
/// candidate/content/parts path, then a flat `text` field.
#[derive(Debug, Default, Deserialize)]
pub struct RawModelResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
}

impl RawModelResponse {
    /// First non-empty text payload, probing candidates before the flat field.
    pub fn first_text(&self) -> Option<&str> {
        let from_candidates = self
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .find(|t| !t.trim().is_empty());

        from_candidates.or_else(|| {
            self.text
                .as_deref()
                .filter(|t| !t.trim().is_empty())
        })
    }
}

/// Extracts the textual payload or fails with `EmptyResponse`.
pub fn extract_text(raw: &RawModelResponse) -> Result<String, AiError> {
    raw.first_text()
        .map(str::to_string)
        .ok_or(AiError::EmptyResponse)
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// TextGenerator seam + Gemini implementation
// ────────────────────────────────────────────────────────────────────────────

/// One generation call against the upstream API. No retry or backoff here —
/// all resilience belongs to the retry controller above this seam.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        handle: &ModelHandle,
        request: &GenerationRequest,
    ) -> Result<RawModelResponse, AiError>;
}

/// Gemini REST client.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base(api_key, GEMINI_API_BASE.to_string())
    }

    pub fn with_base(api_key: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            api_base,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        handle: &ModelHandle,
        request: &GenerationRequest,
    ) -> Result<RawModelResponse, AiError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.options.temperature,
                max_output_tokens: request.options.max_output_tokens,
            },
        };

        debug!(
            "Dispatching {} generation to model '{}'",
            handle.feature.as_str(),
            handle.model_id
        );

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.api_base, handle.model_id, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
