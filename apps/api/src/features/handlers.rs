use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::features::ats::{analyze_resume, AtsAnalysis, AtsInput};
use crate::features::cover_letter::{generate_cover_letter, CoverLetterInput};
use crate::features::insights::{generate_insights, IndustryInsights, InsightsInput};
use crate::features::quiz::{generate_quiz, score_answers, Quiz, QuizInput};
use crate::features::roadmap::{generate_roadmap, CareerRoadmap, RoadmapInput};
use crate::models::{AssessmentRow, CoverLetterRow, IndustryInsightRow, RoadmapRow};
use crate::state::AppState;

/// Cached industry insights older than this are regenerated.
const INSIGHTS_MAX_AGE_DAYS: i64 = 7;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

// ────────────────────────────────────────────────────────────────────────────
// Quiz
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct QuizRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub input: QuizInput,
}

#[derive(Serialize)]
pub struct QuizResponse {
    pub assessment_id: Uuid,
    pub quiz: Quiz,
}

/// POST /api/v1/quiz
pub async fn handle_generate_quiz(
    State(state): State<AppState>,
    Json(req): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    let quiz = generate_quiz(&state.ai, &req.input).await?;

    let assessment_id = Uuid::new_v4();
    let questions = serde_json::to_value(&quiz)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize quiz: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO assessments (id, user_id, industry, questions)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(assessment_id)
    .bind(req.user_id)
    .bind(&req.input.industry)
    .bind(&questions)
    .execute(&state.db)
    .await?;

    Ok(Json(QuizResponse {
        assessment_id,
        quiz,
    }))
}

#[derive(Deserialize)]
pub struct QuizSubmission {
    pub user_id: Uuid,
    pub answers: Vec<String>,
}

#[derive(Serialize)]
pub struct QuizResult {
    pub assessment_id: Uuid,
    pub score: u32,
}

/// POST /api/v1/quiz/:id/submit
pub async fn handle_submit_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<QuizSubmission>,
) -> Result<Json<QuizResult>, AppError> {
    let row: Option<AssessmentRow> =
        sqlx::query_as("SELECT * FROM assessments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(req.user_id)
            .fetch_optional(&state.db)
            .await?;

    let row = row.ok_or_else(|| AppError::NotFound(format!("Assessment {id} not found")))?;
    let quiz: Quiz = serde_json::from_value(row.questions)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored quiz is unreadable: {e}")))?;

    let score = score_answers(&quiz, &req.answers);

    sqlx::query("UPDATE assessments SET score = $1 WHERE id = $2")
        .bind(score as i32)
        .bind(id)
        .execute(&state.db)
        .await?;

    info!("Assessment {id} scored {score}/100 for user {}", req.user_id);
    Ok(Json(QuizResult {
        assessment_id: id,
        score,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// ATS analysis
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ats/analyze
///
/// Stateless: the analysis belongs to the submitted documents, not to a
/// stored entity, so nothing is persisted here.
pub async fn handle_ats_analyze(
    State(state): State<AppState>,
    Json(input): Json<AtsInput>,
) -> Result<Json<AtsAnalysis>, AppError> {
    let analysis = analyze_resume(&state.ai, &input).await?;
    Ok(Json(analysis))
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letters
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CoverLetterRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub input: CoverLetterInput,
}

#[derive(Serialize)]
pub struct CoverLetterResponse {
    pub id: Uuid,
    pub content: String,
}

/// POST /api/v1/cover-letters
pub async fn handle_create_cover_letter(
    State(state): State<AppState>,
    Json(req): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let letter = generate_cover_letter(&state.ai, &req.input).await?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO cover_letters (id, user_id, job_title, company_name, content)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(req.user_id)
    .bind(&req.input.job_title)
    .bind(&req.input.company_name)
    .bind(&letter.content)
    .execute(&state.db)
    .await?;

    Ok(Json(CoverLetterResponse {
        id,
        content: letter.content,
    }))
}

/// GET /api/v1/cover-letters
pub async fn handle_list_cover_letters(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<CoverLetterRow>>, AppError> {
    let rows: Vec<CoverLetterRow> =
        sqlx::query_as("SELECT * FROM cover_letters WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(params.user_id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(rows))
}

// ────────────────────────────────────────────────────────────────────────────
// Industry insights
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/insights
///
/// Insights are per-industry, not per-user, so fresh rows are served from the
/// cache table and regenerated only when stale.
pub async fn handle_insights(
    State(state): State<AppState>,
    Json(input): Json<InsightsInput>,
) -> Result<Json<IndustryInsights>, AppError> {
    let cached: Option<IndustryInsightRow> = sqlx::query_as(
        "SELECT * FROM industry_insights WHERE industry = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(&input.industry)
    .fetch_optional(&state.db)
    .await?;

    if let Some(row) = cached {
        let fresh = Utc::now() - row.created_at < Duration::days(INSIGHTS_MAX_AGE_DAYS);
        if fresh {
            if let Ok(insights) = serde_json::from_value::<IndustryInsights>(row.insights) {
                info!("Serving cached insights for {}", input.industry);
                return Ok(Json(insights));
            }
            // Unreadable cache rows fall through to regeneration.
        }
    }

    let insights = generate_insights(&state.ai, &input).await?;
    let value = serde_json::to_value(&insights)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize insights: {e}")))?;

    sqlx::query("INSERT INTO industry_insights (id, industry, insights) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(&input.industry)
        .bind(&value)
        .execute(&state.db)
        .await?;

    Ok(Json(insights))
}

// ────────────────────────────────────────────────────────────────────────────
// Roadmaps
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RoadmapRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub input: RoadmapInput,
}

#[derive(Serialize)]
pub struct RoadmapResponse {
    pub id: Uuid,
    pub roadmap: CareerRoadmap,
}

/// POST /api/v1/roadmaps
pub async fn handle_create_roadmap(
    State(state): State<AppState>,
    Json(req): Json<RoadmapRequest>,
) -> Result<Json<RoadmapResponse>, AppError> {
    let roadmap = generate_roadmap(&state.ai, &req.input).await?;

    let id = Uuid::new_v4();
    let value = serde_json::to_value(&roadmap)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize roadmap: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO career_roadmaps (id, user_id, title, roadmap)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(req.user_id)
    .bind(&roadmap.title)
    .bind(&value)
    .execute(&state.db)
    .await?;

    Ok(Json(RoadmapResponse { id, roadmap }))
}

/// GET /api/v1/roadmaps
pub async fn handle_list_roadmaps(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<RoadmapRow>>, AppError> {
    let rows: Vec<RoadmapRow> =
        sqlx::query_as("SELECT * FROM career_roadmaps WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(params.user_id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(rows))
}
