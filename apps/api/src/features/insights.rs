//! Industry Insights — market analysis for a given industry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::ai::error::AiError;
use crate::ai::model_pool::Feature;
use crate::ai::{AiService, GenerationRequest};
use crate::errors::AppError;
use crate::features::normalize::{as_number, clamp_score, string_list_or, string_or};
use crate::features::prompts;

const DEFAULT_TOP_SKILL: &str = "Industry knowledge";
const DEFAULT_TREND: &str = "Steady demand";
const DEFAULT_RECOMMENDED_SKILL: &str = "Continuous learning";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Hiring demand for the industry. Unrecognized model output coerces to the
/// default rather than failing the whole analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum DemandLevel {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum MarketOutlook {
    Positive,
    #[default]
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryRange {
    pub role: String,
    pub min: u32,
    pub median: u32,
    pub max: u32,
    pub location: String,
}

/// Normalized industry insights. Growth rate is an integer percentage in
/// [0, 100]; the enum fields always hold a recognized variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryInsights {
    pub salary_ranges: Vec<SalaryRange>,
    pub growth_rate: u32,
    pub demand_level: DemandLevel,
    pub top_skills: Vec<String>,
    pub market_outlook: MarketOutlook,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsightsInput {
    pub industry: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub async fn generate_insights(
    ai: &AiService,
    input: &InsightsInput,
) -> Result<IndustryInsights, AppError> {
    if input.industry.trim().is_empty() {
        return Err(AppError::Validation("industry is required".to_string()));
    }

    let prompt = prompts::insights_prompt(&input.industry);
    let request = GenerationRequest::new(Feature::Insights, prompt);

    let insights = ai
        .generate_json(&request)
        .await
        .and_then(|v| normalize_insights(&v))
        .map_err(|e| {
            warn!("Industry insights generation failed: {e}");
            AppError::Llm("Failed to generate industry insights".to_string())
        })?;

    info!(
        "Generated insights for {}: growth {}%, demand {:?}",
        input.industry, insights.growth_rate, insights.demand_level
    );
    Ok(insights)
}

// ────────────────────────────────────────────────────────────────────────────
// Normalizer
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a parsed insights payload. Nothing here raises: every field has
/// a documented default, so a badly-shaped payload degrades to a generic but
/// structurally valid analysis.
pub fn normalize_insights(value: &Value) -> Result<IndustryInsights, AiError> {
    Ok(IndustryInsights {
        salary_ranges: normalize_salary_ranges(value.get("salaryRanges")),
        growth_rate: as_number(value.get("growthRate")).map(clamp_score).unwrap_or(0),
        demand_level: demand_level_from(value.get("demandLevel")),
        top_skills: string_list_or(value.get("topSkills"), DEFAULT_TOP_SKILL),
        market_outlook: market_outlook_from(value.get("marketOutlook")),
        key_trends: string_list_or(value.get("keyTrends"), DEFAULT_TREND),
        recommended_skills: string_list_or(
            value.get("recommendedSkills"),
            DEFAULT_RECOMMENDED_SKILL,
        ),
    })
}

fn demand_level_from(value: Option<&Value>) -> DemandLevel {
    match value
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("high") => DemandLevel::High,
        Some("low") => DemandLevel::Low,
        Some("medium") => DemandLevel::Medium,
        _ => DemandLevel::default(),
    }
}

fn market_outlook_from(value: Option<&Value>) -> MarketOutlook {
    match value
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("positive") => MarketOutlook::Positive,
        Some("negative") => MarketOutlook::Negative,
        Some("neutral") => MarketOutlook::Neutral,
        _ => MarketOutlook::default(),
    }
}

/// Salary amounts floor at zero; entries without a role are dropped. An
/// unusable list collapses to a single placeholder entry so `salary_ranges`
/// is never empty.
fn normalize_salary_ranges(value: Option<&Value>) -> Vec<SalaryRange> {
    let ranges: Vec<SalaryRange> = value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|item| {
                    let role = item.get("role").and_then(Value::as_str)?.trim();
                    if role.is_empty() {
                        return None;
                    }
                    Some(SalaryRange {
                        role: role.to_string(),
                        min: salary_amount(item.get("min")),
                        median: salary_amount(item.get("median")),
                        max: salary_amount(item.get("max")),
                        location: string_or(item.get("location"), "Remote"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if ranges.is_empty() {
        vec![SalaryRange {
            role: "Industry average".to_string(),
            min: 0,
            median: 0,
            max: 0,
            location: "Remote".to_string(),
        }]
    } else {
        ranges
    }
}

fn salary_amount(value: Option<&Value>) -> u32 {
    as_number(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u32)
        .unwrap_or(0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
