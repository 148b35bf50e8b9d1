//! AI orchestration core — everything between a prompt and a parsed payload.
//!
//! Pipeline for one logical request:
//! rate limiter → model pool → retry { generate + extract } → repair → parse.
//!
//! Feature orchestrators in `features/` own the last step (schema
//! normalization); this module guarantees only that the returned value is
//! valid JSON, never that it matches a feature schema.

pub mod client;
pub mod error;
pub mod model_pool;
pub mod rate_limit;
pub mod repair;
pub mod retry;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::ai::client::TextGenerator;
use crate::ai::error::AiError;
use crate::ai::model_pool::{Feature, ModelPool};
use crate::ai::rate_limit::RateLimiter;

/// Sampling options for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// One immutable generation request. Retries reuse the identical request;
/// nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub feature: Feature,
    pub prompt: String,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    /// Request with the feature's default sampling options.
    pub fn new(feature: Feature, prompt: String) -> Self {
        Self {
            options: feature.default_options(),
            feature,
            prompt,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Tunables for the orchestration core, loaded from config at startup.
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub default_model: String,
    pub model_overrides: HashMap<Feature, String>,
    pub max_requests_per_minute: u32,
    pub max_attempts: u32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            default_model: "gemini-2.0-flash".to_string(),
            model_overrides: HashMap::new(),
            max_requests_per_minute: 50,
            max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// The injectable AI service shared by all handlers. Holds the process-wide
/// rate-limit window and model-handle cache; everything else is per-call.
pub struct AiService {
    backend: Arc<dyn TextGenerator>,
    limiter: RateLimiter,
    pool: ModelPool,
    max_attempts: u32,
}

impl AiService {
    pub fn new(backend: Arc<dyn TextGenerator>, settings: AiSettings) -> Self {
        Self {
            limiter: RateLimiter::new(settings.max_requests_per_minute),
            pool: ModelPool::new(&settings.default_model, &settings.model_overrides),
            max_attempts: settings.max_attempts.max(1),
            backend,
        }
    }

    /// Runs the full pipeline and returns the parsed (but untrusted) JSON
    /// payload. Transient upstream failures are retried with backoff; a
    /// malformed payload is not — regenerating identical text cannot fix it,
    /// so the error surfaces immediately for the orchestrator to handle.
    pub async fn generate_json(
        &self,
        request: &GenerationRequest,
    ) -> Result<serde_json::Value, AiError> {
        self.limiter.acquire().await?;
        let handle = self.pool.handle(request.feature).await?;

        debug!(
            "Dispatching {} request to {} (temperature={})",
            request.feature.as_str(),
            handle.model_id,
            request.options.temperature
        );

        let text = retry::execute(self.max_attempts, || {
            let handle = Arc::clone(&handle);
            async move {
                let raw = self.backend.generate(&handle, request).await?;
                client::extract_text(&raw)
            }
        })
        .await?;

        let repaired = repair::repair_json_text(&text);
        repair::parse_payload(repaired)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test support
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod testing {
    //! Mock generation backend for orchestrator tests. Replies are consumed
    //! in order; an exhausted queue yields an upstream error.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::client::{RawModelResponse, TextGenerator};
    use super::error::AiError;
    use super::model_pool::ModelHandle;
    use super::{AiService, AiSettings, GenerationRequest};

    pub enum MockReply {
        /// Candidate-shaped response carrying this text payload.
        Text(String),
        /// Response with no extractable text.
        Empty,
        /// Upstream API failure with this status.
        ApiError(u16),
    }

    #[derive(Default)]
    pub struct MockGenerator {
        replies: Mutex<VecDeque<MockReply>>,
        pub calls: AtomicU32,
    }

    impl MockGenerator {
        pub fn replying(replies: Vec<MockReply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicU32::new(0),
            })
        }

        pub fn with_text(text: &str) -> Arc<Self> {
            Self::replying(vec![MockReply::Text(text.to_string())])
        }

        pub fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(
            &self,
            _handle: &ModelHandle,
            _request: &GenerationRequest,
        ) -> Result<RawModelResponse, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(MockReply::Text(text)) => Ok(serde_json::from_value(serde_json::json!({
                    "candidates": [{"content": {"parts": [{"text": text}]}}]
                }))
                .unwrap()),
                Some(MockReply::Empty) => Ok(RawModelResponse::default()),
                Some(MockReply::ApiError(status)) => Err(AiError::Api {
                    status,
                    message: "mock upstream failure".to_string(),
                }),
                None => Err(AiError::Api {
                    status: 500,
                    message: "mock reply queue exhausted".to_string(),
                }),
            }
        }
    }

    /// Service wired to the given mock with test-friendly settings.
    pub fn service_with(backend: Arc<MockGenerator>) -> AiService {
        AiService::new(
            backend,
            AiSettings {
                max_attempts: 2,
                ..AiSettings::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{service_with, MockGenerator, MockReply};
    use super::*;

    fn quiz_request() -> GenerationRequest {
        GenerationRequest::new(Feature::Quiz, "generate a quiz".to_string())
    }

    #[tokio::test]
    async fn test_pipeline_returns_parsed_json() {
        let backend = MockGenerator::with_text("```json\n{\"ok\": true}\n```");
        let service = service_with(Arc::clone(&backend));

        let value = service.generate_json(&quiz_request()).await.unwrap();
        assert_eq!(value["ok"], serde_json::json!(true));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_upstream_failure_is_retried() {
        let backend = MockGenerator::replying(vec![
            MockReply::ApiError(503),
            MockReply::Text("{\"ok\": 1}".to_string()),
        ]);
        let service = service_with(Arc::clone(&backend));

        let value = service.generate_json(&quiz_request()).await.unwrap();
        assert_eq!(value["ok"], serde_json::json!(1));
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_response_is_retried_like_upstream_failure() {
        let backend = MockGenerator::replying(vec![
            MockReply::Empty,
            MockReply::Text("{\"ok\": 2}".to_string()),
        ]);
        let service = service_with(Arc::clone(&backend));

        let value = service.generate_json(&quiz_request()).await.unwrap();
        assert_eq!(value["ok"], serde_json::json!(2));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_not_retried() {
        let backend = MockGenerator::replying(vec![
            MockReply::Text("this is not json at all".to_string()),
            MockReply::Text("{\"never\": \"reached\"}".to_string()),
        ]);
        let service = service_with(Arc::clone(&backend));

        let err = service.generate_json(&quiz_request()).await.unwrap_err();
        assert!(matches!(err, AiError::MalformedPayload { .. }));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_last_error() {
        let backend =
            MockGenerator::replying(vec![MockReply::ApiError(500), MockReply::ApiError(503)]);
        let service = service_with(Arc::clone(&backend));

        let err = service.generate_json(&quiz_request()).await.unwrap_err();
        assert!(matches!(err, AiError::Api { status: 503, .. }));
        assert_eq!(backend.call_count(), 2);
    }

    #[test]
    fn test_request_defaults_come_from_feature() {
        let request = quiz_request();
        assert_eq!(request.options, Feature::Quiz.default_options());
    }

    #[test]
    fn test_request_options_can_be_overridden() {
        let request = quiz_request().with_options(GenerationOptions {
            temperature: 0.9,
            max_output_tokens: 128,
        });
        assert_eq!(request.options.max_output_tokens, 128);
    }
}
