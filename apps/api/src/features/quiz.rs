//! Interview Quiz — generates multiple-choice technical questions.
//!
//! The quiz orchestrator is the one feature with a static fallback: a user
//! mid-practice gets a minimal one-question quiz instead of an error page
//! when the pipeline fails outright.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::ai::error::AiError;
use crate::ai::model_pool::Feature;
use crate::ai::{AiService, GenerationRequest};
use crate::errors::AppError;
use crate::features::normalize::string_or;
use crate::features::prompts;

/// Every question carries exactly this many options.
const OPTIONS_PER_QUESTION: usize = 4;

const DEFAULT_EXPLANATION: &str = "No explanation provided.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

/// Normalized quiz: at least one question, each with exactly 4 options and a
/// correct answer that is one of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizInput {
    pub industry: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

/// Generates a quiz for the given industry and skills. Total pipeline or
/// normalization failure returns the static fallback quiz rather than an
/// error — documented behavior, not a silent swallow: the failure is logged.
pub async fn generate_quiz(ai: &AiService, input: &QuizInput) -> Result<Quiz, AppError> {
    if input.industry.trim().is_empty() {
        return Err(AppError::Validation("industry is required".to_string()));
    }

    let prompt = prompts::quiz_prompt(&input.industry, &input.skills);
    let request = GenerationRequest::new(Feature::Quiz, prompt);

    let quiz = match ai.generate_json(&request).await.and_then(|v| normalize_quiz(&v)) {
        Ok(quiz) => quiz,
        Err(e) => {
            warn!("Quiz generation failed, serving fallback quiz: {e}");
            fallback_quiz()
        }
    };

    info!("Generated quiz with {} questions", quiz.questions.len());
    Ok(quiz)
}

/// Percentage of answers matching the correct option, rounded, in [0, 100].
/// Used when persisting a completed assessment.
pub fn score_answers(quiz: &Quiz, answers: &[String]) -> u32 {
    if quiz.questions.is_empty() {
        return 0;
    }
    let correct = quiz
        .questions
        .iter()
        .zip(answers.iter())
        .filter(|(q, a)| q.correct_answer == **a)
        .count();
    ((correct as f64 / quiz.questions.len() as f64) * 100.0).round() as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Normalizer
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a parsed quiz payload. Questions missing text or without
/// exactly 4 usable options are dropped; a correct answer not found among the
/// options is coerced to the first option. No surviving questions raises.
pub fn normalize_quiz(value: &Value) -> Result<Quiz, AiError> {
    let raw_questions = value
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AiError::ValidationFailed("questions missing or not an array".to_string())
        })?;

    let questions: Vec<QuizQuestion> = raw_questions.iter().filter_map(normalize_question).collect();

    if questions.is_empty() {
        return Err(AiError::ValidationFailed(
            "no usable questions after normalization".to_string(),
        ));
    }

    Ok(Quiz { questions })
}

fn normalize_question(value: &Value) -> Option<QuizQuestion> {
    let question = value.get("question")?.as_str()?.trim();
    if question.is_empty() {
        return None;
    }

    let options: Vec<String> = value
        .get("options")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .collect();
    if options.len() != OPTIONS_PER_QUESTION {
        return None;
    }

    let claimed = value
        .get("correctAnswer")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let correct_answer = if options.iter().any(|o| o == claimed) {
        claimed.to_string()
    } else {
        options[0].clone()
    };

    Some(QuizQuestion {
        question: question.to_string(),
        options,
        correct_answer,
        explanation: string_or(value.get("explanation"), DEFAULT_EXPLANATION),
    })
}

/// Static fallback served when generation fails outright.
pub fn fallback_quiz() -> Quiz {
    Quiz {
        questions: vec![QuizQuestion {
            question: "Which practice most improves the maintainability of a codebase?"
                .to_string(),
            options: vec![
                "Writing automated tests".to_string(),
                "Avoiding version control".to_string(),
                "Duplicating code for safety".to_string(),
                "Skipping code review".to_string(),
            ],
            correct_answer: "Writing automated tests".to_string(),
            explanation: "Automated tests catch regressions early and document intended behavior."
                .to_string(),
        }],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{service_with, MockGenerator, MockReply};
    use serde_json::json;

    fn input() -> QuizInput {
        QuizInput {
            industry: "software".to_string(),
            skills: vec!["Rust".to_string()],
        }
    }

    #[tokio::test]
    async fn test_end_to_end_fenced_quiz_response() {
        let text = "```json\n{\"questions\":[{\"question\":\"Q1\",\
                    \"options\":[\"A\",\"B\",\"C\",\"D\"],\
                    \"correctAnswer\":\"A\",\"explanation\":\"E\"}]}\n```";
        let ai = service_with(MockGenerator::with_text(text));

        let quiz = generate_quiz(&ai, &input()).await.unwrap();
        assert_eq!(quiz.questions.len(), 1);
        let q = &quiz.questions[0];
        assert_eq!(q.question, "Q1");
        assert_eq!(q.options, vec!["A", "B", "C", "D"]);
        assert_eq!(q.correct_answer, "A");
        assert_eq!(q.explanation, "E");
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_failure_serves_fallback_quiz() {
        let ai = service_with(MockGenerator::replying(vec![
            MockReply::ApiError(500),
            MockReply::ApiError(503),
        ]));

        let quiz = generate_quiz(&ai, &input()).await.unwrap();
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(
            quiz.questions[0].correct_answer,
            quiz.questions[0].options[0]
        );
    }

    #[tokio::test]
    async fn test_unusable_payload_serves_fallback_quiz() {
        let ai = service_with(MockGenerator::with_text("{\"questions\": []}"));
        let quiz = generate_quiz(&ai, &input()).await.unwrap();
        assert_eq!(quiz.questions.len(), fallback_quiz().questions.len());
    }

    #[test]
    fn test_question_with_wrong_option_count_is_dropped() {
        let payload = json!({"questions": [
            {"question": "Q1", "options": ["A", "B"], "correctAnswer": "A"},
            {"question": "Q2", "options": ["A", "B", "C", "D"], "correctAnswer": "B"}
        ]});
        let quiz = normalize_quiz(&payload).unwrap();
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].question, "Q2");
    }

    #[test]
    fn test_unknown_correct_answer_coerces_to_first_option() {
        let payload = json!({"questions": [
            {"question": "Q", "options": ["A", "B", "C", "D"], "correctAnswer": "Z"}
        ]});
        let quiz = normalize_quiz(&payload).unwrap();
        assert_eq!(quiz.questions[0].correct_answer, "A");
    }

    #[test]
    fn test_missing_explanation_gets_default() {
        let payload = json!({"questions": [
            {"question": "Q", "options": ["A", "B", "C", "D"], "correctAnswer": "C"}
        ]});
        let quiz = normalize_quiz(&payload).unwrap();
        assert_eq!(quiz.questions[0].explanation, "No explanation provided.");
    }

    #[test]
    fn test_missing_questions_field_raises() {
        assert!(normalize_quiz(&json!({"other": 1})).is_err());
        assert!(normalize_quiz(&json!({"questions": "nope"})).is_err());
    }

    #[test]
    fn test_score_answers_counts_matches() {
        let payload = json!({"questions": [
            {"question": "Q1", "options": ["A", "B", "C", "D"], "correctAnswer": "A"},
            {"question": "Q2", "options": ["A", "B", "C", "D"], "correctAnswer": "B"},
            {"question": "Q3", "options": ["A", "B", "C", "D"], "correctAnswer": "C"}
        ]});
        let quiz = normalize_quiz(&payload).unwrap();

        let score = score_answers(
            &quiz,
            &["A".to_string(), "D".to_string(), "C".to_string()],
        );
        assert_eq!(score, 67);
    }

    #[test]
    fn test_score_answers_handles_short_answer_list() {
        let quiz = fallback_quiz();
        assert_eq!(score_answers(&quiz, &[]), 0);
    }

    #[test]
    fn test_fallback_quiz_is_internally_consistent() {
        let quiz = fallback_quiz();
        let q = &quiz.questions[0];
        assert_eq!(q.options.len(), 4);
        assert!(q.options.contains(&q.correct_answer));
    }
}
