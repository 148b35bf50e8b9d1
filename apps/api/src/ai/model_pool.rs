//! Model Pool — lazily-initialized upstream model handles, one per feature.
//!
//! Each feature keys a slot holding a `tokio::sync::OnceCell`, which gives
//! single-flight initialization: concurrent first-use of the same feature
//! runs at most one creation, and all waiters receive the same handle. A
//! failed creation is not cached, so a later call may retry it.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::ai::error::AiError;
use crate::ai::GenerationOptions;

/// Logical feature name. Every feature maps to its own pool slot; unknown
/// names fall back to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Quiz,
    Email,
    CoverLetter,
    Insights,
    Resume,
    Roadmap,
    General,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::Quiz,
        Feature::Email,
        Feature::CoverLetter,
        Feature::Insights,
        Feature::Resume,
        Feature::Roadmap,
        Feature::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Quiz => "quiz",
            Feature::Email => "email",
            Feature::CoverLetter => "cover_letter",
            Feature::Insights => "insights",
            Feature::Resume => "resume",
            Feature::Roadmap => "roadmap",
            Feature::General => "general",
        }
    }

    /// Per-feature generation defaults. Quiz and insights want predictable
    /// structure (low temperature); writing features get more freedom.
    pub fn default_options(&self) -> GenerationOptions {
        match self {
            Feature::Quiz | Feature::Insights => GenerationOptions {
                temperature: 0.3,
                max_output_tokens: 4096,
            },
            Feature::CoverLetter | Feature::Email => GenerationOptions {
                temperature: 0.8,
                max_output_tokens: 2048,
            },
            Feature::Resume | Feature::Roadmap => GenerationOptions {
                temperature: 0.6,
                max_output_tokens: 4096,
            },
            Feature::General => GenerationOptions {
                temperature: 0.7,
                max_output_tokens: 2048,
            },
        }
    }
}

impl FromStr for Feature {
    type Err = std::convert::Infallible;

    /// Unknown feature names fall back to the general pool.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "quiz" => Feature::Quiz,
            "email" => Feature::Email,
            "cover_letter" | "cover-letter" | "coverletter" => Feature::CoverLetter,
            "insights" => Feature::Insights,
            "resume" => Feature::Resume,
            "roadmap" => Feature::Roadmap,
            _ => Feature::General,
        })
    }
}

/// Opaque reference to a configured upstream generation endpoint for one
/// feature. Construction is cheap but validated; the upstream rejects bad
/// model ids only at call time, so the obvious misconfigurations are caught
/// here instead.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    pub model_id: String,
    pub feature: Feature,
}

impl ModelHandle {
    fn create(model_id: &str, feature: Feature) -> Result<Self, AiError> {
        let model_id = model_id.trim();
        if model_id.is_empty() || model_id.contains(char::is_whitespace) {
            return Err(AiError::BadModel {
                feature: feature.as_str().to_string(),
                model_id: model_id.to_string(),
            });
        }

        debug!("Created model handle for {}: {}", feature.as_str(), model_id);
        Ok(ModelHandle {
            model_id: model_id.to_string(),
            feature,
        })
    }
}

struct PoolSlot {
    model_id: String,
    cell: OnceCell<Arc<ModelHandle>>,
}

/// Per-feature handle cache, shared across all requests in the process.
pub struct ModelPool {
    slots: HashMap<Feature, PoolSlot>,
}

impl ModelPool {
    /// Builds a slot for every feature. `overrides` lets a feature use a
    /// different model than the shared default.
    pub fn new(default_model: &str, overrides: &HashMap<Feature, String>) -> Self {
        let slots = Feature::ALL
            .iter()
            .map(|&feature| {
                let model_id = overrides
                    .get(&feature)
                    .cloned()
                    .unwrap_or_else(|| default_model.to_string());
                (
                    feature,
                    PoolSlot {
                        model_id,
                        cell: OnceCell::new(),
                    },
                )
            })
            .collect();
        Self { slots }
    }

    /// Returns the lazily-created handle for `feature`. Creation runs at most
    /// once per feature across concurrent callers; creation errors propagate
    /// without being cached.
    pub async fn handle(&self, feature: Feature) -> Result<Arc<ModelHandle>, AiError> {
        // Every variant has a slot by construction.
        let slot = self
            .slots
            .get(&feature)
            .unwrap_or_else(|| &self.slots[&Feature::General]);

        slot.cell
            .get_or_try_init(|| async {
                ModelHandle::create(&slot.model_id, feature).map(Arc::new)
            })
            .await
            .cloned()
    }
}
