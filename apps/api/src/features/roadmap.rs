//! Career Roadmap — ordered steps from a current role to a target role.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::ai::error::AiError;
use crate::ai::model_pool::Feature;
use crate::ai::{AiService, GenerationRequest};
use crate::errors::AppError;
use crate::features::normalize::{string_list, string_or};
use crate::features::prompts;

const DEFAULT_STEP_DESCRIPTION: &str = "Work toward this milestone.";
const DEFAULT_DURATION: &str = "3-6 months";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub skills: Vec<String>,
    pub resources: Vec<String>,
}

/// Normalized roadmap: a title and at least one ordered step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerRoadmap {
    pub title: String,
    pub steps: Vec<RoadmapStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoadmapInput {
    pub current_role: String,
    pub target_role: String,
    pub industry: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub async fn generate_roadmap(
    ai: &AiService,
    input: &RoadmapInput,
) -> Result<CareerRoadmap, AppError> {
    if input.current_role.trim().is_empty() || input.target_role.trim().is_empty() {
        return Err(AppError::Validation(
            "current_role and target_role are required".to_string(),
        ));
    }

    let prompt = prompts::roadmap_prompt(&input.current_role, &input.target_role, &input.industry);
    let request = GenerationRequest::new(Feature::Roadmap, prompt);

    let roadmap = ai
        .generate_json(&request)
        .await
        .and_then(|v| normalize_roadmap(&v, input))
        .map_err(|e| {
            warn!("Roadmap generation failed: {e}");
            AppError::Llm("Failed to generate career roadmap".to_string())
        })?;

    info!(
        "Generated roadmap '{}' with {} steps",
        roadmap.title,
        roadmap.steps.len()
    );
    Ok(roadmap)
}

// ────────────────────────────────────────────────────────────────────────────
// Normalizer
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a parsed roadmap payload. Steps without a title are dropped;
/// each surviving step gets documented defaults for missing text fields. An
/// empty step list raises — a roadmap with no steps is useless.
pub fn normalize_roadmap(value: &Value, input: &RoadmapInput) -> Result<CareerRoadmap, AiError> {
    let steps: Vec<RoadmapStep> = value
        .get("steps")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(normalize_step).collect())
        .unwrap_or_default();

    if steps.is_empty() {
        return Err(AiError::ValidationFailed(
            "roadmap has no usable steps".to_string(),
        ));
    }

    let default_title = format!("{} to {}", input.current_role, input.target_role);
    Ok(CareerRoadmap {
        title: string_or(value.get("title"), &default_title),
        steps,
    })
}

fn normalize_step(value: &Value) -> Option<RoadmapStep> {
    let title = value.get("title").and_then(Value::as_str)?.trim();
    if title.is_empty() {
        return None;
    }

    Some(RoadmapStep {
        title: title.to_string(),
        description: string_or(value.get("description"), DEFAULT_STEP_DESCRIPTION),
        duration: string_or(value.get("duration"), DEFAULT_DURATION),
        skills: string_list(value.get("skills")),
        resources: string_list(value.get("resources")),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
