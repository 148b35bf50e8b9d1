//! ATS Analysis — scores a résumé against a job description.
//!
//! The normalizer is the contract here: whatever shape the model returns,
//! callers receive an `AtsAnalysis` with every field present, scores clamped
//! into [0, 100], soft skills filtered out of the matched-skill list, and
//! recommendations reshaped into a uniform record format.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::ai::error::AiError;
use crate::ai::model_pool::Feature;
use crate::ai::{AiService, GenerationRequest};
use crate::errors::AppError;
use crate::features::normalize::{as_number, clamp_score, string_list_or, string_or};
use crate::features::prompts;

/// Soft-skill terms removed from matched-skill lists. An ATS cares about
/// hard skills; models pad with these anyway.
const SOFT_SKILL_DENYLIST: [&str; 9] = [
    "communication",
    "teamwork",
    "leadership",
    "problem solving",
    "attention to detail",
    "time management",
    "interpersonal",
    "work ethic",
    "adaptability",
];

/// Max matched skills kept after filtering.
const MAX_SKILLS: usize = 10;

/// Category rotation for recommendations given as plain strings: the first
/// three get these in order, the remainder fall to General Improvement.
const CATEGORY_ROTATION: [&str; 3] = ["Keyword Optimization", "Content Enhancement", "Formatting"];

const DEFAULT_CATEGORY: &str = "General Improvement";
const DEFAULT_PRIORITY: &str = "Medium";
const DEFAULT_ACTION: &str = "Review resume content";
const DEFAULT_IMPACT: &str = "Improves ATS compatibility";
const DEFAULT_STRENGTH: &str = "Resume successfully analyzed";
const DEFAULT_WEAKNESS: &str = "No major weaknesses detected";
const DEFAULT_MISSING_KEYWORD: &str = "None identified";
const DEFAULT_SUMMARY: &str = "Resume analysis completed successfully.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A single uniform improvement recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub priority: String,
    pub action: String,
    pub impact: String,
}

/// Fully normalized ATS analysis. Every field is guaranteed present; both
/// scores are integers in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsAnalysis {
    pub ats_score: u32,
    pub match_percentage: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub matched_skills: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub summary: String,
}

/// Caller-supplied input. The résumé arrives as text; upload parsing belongs
/// to the excluded UI layer.
#[derive(Debug, Clone, Deserialize)]
pub struct AtsInput {
    pub job_description: String,
    pub resume_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

/// Runs the ATS analysis pipeline: prompt → generate → normalize.
pub async fn analyze_resume(ai: &AiService, input: &AtsInput) -> Result<AtsAnalysis, AppError> {
    if input.job_description.trim().is_empty() || input.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Both job_description and resume_text are required".to_string(),
        ));
    }

    let prompt = prompts::ats_prompt(&input.job_description, &input.resume_text);
    let request = GenerationRequest::new(Feature::Resume, prompt);

    let value = ai.generate_json(&request).await.map_err(|e| {
        warn!("ATS analysis pipeline failed: {e}");
        AppError::Llm("Failed to analyze resume".to_string())
    })?;

    let analysis = normalize_ats(&value).map_err(|e| {
        warn!("ATS analysis normalization failed: {e}");
        AppError::Llm("Failed to analyze resume".to_string())
    })?;

    info!(
        "ATS analysis complete: score={} match={}%",
        analysis.ats_score, analysis.match_percentage
    );
    Ok(analysis)
}

// ────────────────────────────────────────────────────────────────────────────
// Normalizer
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a parsed ATS payload into the canonical shape.
///
/// `atsScore` is the one field with no sensible default: absent, non-numeric,
/// or exactly zero means the model failed to score, which raises rather than
/// silently returning 0. `matchPercentage` is derivable (`atsScore − 10`,
/// floored at 0) so it never raises.
pub fn normalize_ats(value: &Value) -> Result<AtsAnalysis, AiError> {
    let ats_score = match as_number(value.get("atsScore")) {
        Some(n) if n != 0.0 => clamp_score(n),
        _ => {
            return Err(AiError::ValidationFailed(
                "atsScore missing or zero — the model failed to score the resume".to_string(),
            ))
        }
    };

    let match_percentage = match as_number(value.get("matchPercentage")) {
        Some(n) => clamp_score(n),
        None => ats_score.saturating_sub(10),
    };

    Ok(AtsAnalysis {
        ats_score,
        match_percentage,
        strengths: string_list_or(value.get("strengths"), DEFAULT_STRENGTH),
        weaknesses: string_list_or(value.get("weaknesses"), DEFAULT_WEAKNESS),
        missing_keywords: string_list_or(value.get("missingKeywords"), DEFAULT_MISSING_KEYWORD),
        matched_skills: filter_skills(value.get("matchedSkills")),
        recommendations: reshape_recommendations(value.get("recommendations")),
        summary: string_or(value.get("summary"), DEFAULT_SUMMARY),
    })
}

/// Drops denylisted soft-skill entries (case-insensitive substring match),
/// preserves order, truncates to `MAX_SKILLS`.
fn filter_skills(value: Option<&Value>) -> Vec<String> {
    let mut skills: Vec<String> = value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .filter(|s| {
                    let lower = s.to_lowercase();
                    !SOFT_SKILL_DENYLIST.iter().any(|term| lower.contains(term))
                })
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    skills.truncate(MAX_SKILLS);
    skills
}

/// Reshapes heterogeneous recommendations into uniform records.
///
/// Plain strings get categories from the fixed rotation and High priority for
/// the first two entries, Medium after. Partially-structured objects keep
/// what they carry and fill the rest with the documented defaults. A missing
/// or invalid field yields a single generic recommendation.
fn reshape_recommendations(value: Option<&Value>) -> Vec<Recommendation> {
    let items = match value.and_then(Value::as_array) {
        Some(arr) if !arr.is_empty() => arr,
        _ => {
            return vec![Recommendation {
                category: DEFAULT_CATEGORY.to_string(),
                priority: DEFAULT_PRIORITY.to_string(),
                action: DEFAULT_ACTION.to_string(),
                impact: DEFAULT_IMPACT.to_string(),
            }]
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match item {
            Value::String(action) => Some(Recommendation {
                category: CATEGORY_ROTATION
                    .get(i)
                    .copied()
                    .unwrap_or(DEFAULT_CATEGORY)
                    .to_string(),
                priority: if i < 2 { "High" } else { "Medium" }.to_string(),
                action: action.clone(),
                impact: DEFAULT_IMPACT.to_string(),
            }),
            Value::Object(_) => Some(Recommendation {
                category: string_or(item.get("category"), DEFAULT_CATEGORY),
                priority: string_or(item.get("priority"), DEFAULT_PRIORITY),
                action: string_or(item.get("action"), DEFAULT_ACTION),
                impact: string_or(item.get("impact"), DEFAULT_IMPACT),
            }),
            _ => None,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{service_with, MockGenerator};
    use serde_json::json;

    fn base_payload() -> Value {
        json!({
            "atsScore": 78,
            "matchPercentage": 70,
            "strengths": ["Strong Rust experience"],
            "weaknesses": ["No Kubernetes exposure"],
            "missingKeywords": ["Kubernetes"],
            "matchedSkills": ["Rust", "PostgreSQL"],
            "recommendations": ["Add more keywords"],
            "summary": "Solid technical resume."
        })
    }

    #[test]
    fn test_scores_are_always_clamped_integers() {
        let cases = [
            (json!(150), 100),
            (json!(99.6), 100),
            (json!(-20), 0),
            (json!(0.4), 0),
        ];
        for (raw, expected) in cases {
            let mut payload = base_payload();
            payload["matchPercentage"] = raw;
            let analysis = normalize_ats(&payload).unwrap();
            assert_eq!(analysis.match_percentage, expected);
            assert!(analysis.ats_score <= 100);
        }
    }

    #[test]
    fn test_missing_or_zero_ats_score_raises() {
        for raw in [json!(null), json!(0), json!("85"), json!([])] {
            let mut payload = base_payload();
            payload["atsScore"] = raw.clone();
            let err = normalize_ats(&payload).unwrap_err();
            assert!(
                matches!(err, AiError::ValidationFailed(_)),
                "expected ValidationFailed for atsScore={raw}"
            );
        }
    }

    #[test]
    fn test_required_arrays_are_never_empty() {
        for raw in [json!([]), json!(null), json!("not an array")] {
            let mut payload = base_payload();
            payload["strengths"] = raw.clone();
            payload["weaknesses"] = raw.clone();
            payload["missingKeywords"] = raw;
            let analysis = normalize_ats(&payload).unwrap();
            assert!(!analysis.strengths.is_empty());
            assert!(!analysis.weaknesses.is_empty());
            assert!(!analysis.missing_keywords.is_empty());
        }
    }

    #[test]
    fn test_soft_skills_are_filtered_in_order() {
        let mut payload = base_payload();
        payload["matchedSkills"] = json!(["React", "communication", "Docker", "teamwork"]);
        let analysis = normalize_ats(&payload).unwrap();
        assert_eq!(analysis.matched_skills, vec!["React", "Docker"]);
    }

    #[test]
    fn test_skill_filter_is_case_insensitive_and_substring_based() {
        let mut payload = base_payload();
        payload["matchedSkills"] = json!(["Team Leadership", "Rust", "Strong Communication Skills"]);
        let analysis = normalize_ats(&payload).unwrap();
        assert_eq!(analysis.matched_skills, vec!["Rust"]);
    }

    #[test]
    fn test_skills_truncate_to_ten() {
        let skills: Vec<String> = (0..15).map(|i| format!("Skill{i}")).collect();
        let mut payload = base_payload();
        payload["matchedSkills"] = json!(skills);
        let analysis = normalize_ats(&payload).unwrap();
        assert_eq!(analysis.matched_skills.len(), 10);
        assert_eq!(analysis.matched_skills[0], "Skill0");
    }

    #[test]
    fn test_string_recommendations_get_rotation_and_priorities() {
        let mut payload = base_payload();
        payload["recommendations"] = json!([
            "Add keywords",
            "Use metrics",
            "Fix formatting",
            "Improve layout"
        ]);
        let analysis = normalize_ats(&payload).unwrap();

        let categories: Vec<&str> = analysis
            .recommendations
            .iter()
            .map(|r| r.category.as_str())
            .collect();
        assert_eq!(
            categories,
            vec![
                "Keyword Optimization",
                "Content Enhancement",
                "Formatting",
                "General Improvement"
            ]
        );

        let priorities: Vec<&str> = analysis
            .recommendations
            .iter()
            .map(|r| r.priority.as_str())
            .collect();
        assert_eq!(priorities, vec!["High", "High", "Medium", "Medium"]);
        assert_eq!(analysis.recommendations[0].action, "Add keywords");
    }

    #[test]
    fn test_partial_object_recommendations_get_defaults_filled() {
        let mut payload = base_payload();
        payload["recommendations"] = json!([
            {"action": "Quantify achievements", "priority": "High"},
            {"category": "Formatting"}
        ]);
        let analysis = normalize_ats(&payload).unwrap();

        assert_eq!(analysis.recommendations[0].action, "Quantify achievements");
        assert_eq!(analysis.recommendations[0].priority, "High");
        assert_eq!(analysis.recommendations[0].category, "General Improvement");
        assert_eq!(analysis.recommendations[0].impact, "Improves ATS compatibility");

        assert_eq!(analysis.recommendations[1].category, "Formatting");
        assert_eq!(analysis.recommendations[1].action, "Review resume content");
    }

    #[test]
    fn test_missing_recommendations_yield_single_generic_record() {
        let mut payload = base_payload();
        payload["recommendations"] = json!(null);
        let analysis = normalize_ats(&payload).unwrap();
        assert_eq!(analysis.recommendations.len(), 1);
        assert_eq!(analysis.recommendations[0].category, "General Improvement");
    }

    #[test]
    fn test_overclamped_score_derives_match_percentage() {
        let payload = json!({
            "atsScore": 150,
            "weaknesses": []
        });
        let analysis = normalize_ats(&payload).unwrap();
        assert_eq!(analysis.ats_score, 100);
        assert_eq!(analysis.match_percentage, 90);
        assert_eq!(analysis.weaknesses, vec!["No major weaknesses detected"]);
    }

    #[test]
    fn test_low_score_derivation_floors_at_zero() {
        let payload = json!({"atsScore": 5});
        let analysis = normalize_ats(&payload).unwrap();
        assert_eq!(analysis.match_percentage, 0);
    }

    #[test]
    fn test_missing_summary_gets_generic_message() {
        let mut payload = base_payload();
        payload["summary"] = json!(42);
        let analysis = normalize_ats(&payload).unwrap();
        assert_eq!(analysis.summary, "Resume analysis completed successfully.");
    }

    #[tokio::test]
    async fn test_orchestrator_end_to_end_with_fenced_response() {
        let text = "```json\n{\"atsScore\": 82, \"matchPercentage\": 75, \
                    \"strengths\": [\"clear impact bullets\"], \"weaknesses\": [], \
                    \"matchedSkills\": [\"Rust\"], \"recommendations\": [\"Add keywords\"], \
                    \"summary\": \"Good.\"}\n```";
        let ai = service_with(MockGenerator::with_text(text));

        let input = AtsInput {
            job_description: "Senior Rust Engineer".to_string(),
            resume_text: "Ten years of Rust.".to_string(),
        };
        let analysis = analyze_resume(&ai, &input).await.unwrap();
        assert_eq!(analysis.ats_score, 82);
        assert_eq!(analysis.weaknesses, vec!["No major weaknesses detected"]);
    }

    #[tokio::test]
    async fn test_orchestrator_wraps_failures_in_feature_named_error() {
        let ai = service_with(MockGenerator::with_text("not json"));
        let input = AtsInput {
            job_description: "JD".to_string(),
            resume_text: "CV".to_string(),
        };
        let err = analyze_resume(&ai, &input).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(msg) if msg == "Failed to analyze resume"));
    }

    #[tokio::test]
    async fn test_orchestrator_rejects_empty_input_without_model_call() {
        let backend = MockGenerator::with_text("{}");
        let ai = service_with(std::sync::Arc::clone(&backend));
        let input = AtsInput {
            job_description: "".to_string(),
            resume_text: "CV".to_string(),
        };
        let err = analyze_resume(&ai, &input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(backend.call_count(), 0);
    }
}
