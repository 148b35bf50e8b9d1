//! Error taxonomy for the AI orchestration core.
//!
//! Transient errors (network, API 429/5xx, empty responses) are retried by
//! the retry controller; structural errors (malformed payload, failed
//! validation) are not — regenerating the same malformed text is pointless.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limit exceeded ({max_per_minute} requests/minute)")]
    RateLimitExceeded { max_per_minute: u32 },

    #[error("model returned no extractable text")]
    EmptyResponse,

    #[error("invalid model id for {feature}: {model_id:?}")]
    BadModel { feature: String, model_id: String },

    #[error("malformed payload: {reason}; text preview: {preview}")]
    MalformedPayload { reason: String, preview: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

impl AiError {
    /// Whether the retry controller should attempt the request again.
    ///
    /// Http/Api/EmptyResponse are transient: the upstream may succeed on a
    /// fresh call. Everything else is systemic and fails fast.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AiError::Http(_) | AiError::Api { .. } | AiError::EmptyResponse
        )
    }
}
