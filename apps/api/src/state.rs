use std::sync::Arc;

use sqlx::PgPool;

use crate::ai::AiService;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// `ai` is the explicitly-constructed orchestration service: the rate-limit
/// window and model-handle cache live inside it, shared across requests, and
/// tests inject a fresh instance wired to a mock backend.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub ai: Arc<AiService>,
}
