use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted quiz assessment. `questions` stores the normalized quiz as
/// JSONB; `score` is filled when the user submits answers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub industry: String,
    pub questions: Value,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CoverLetterRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Cached per-industry insights, refreshed when stale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IndustryInsightRow {
    pub id: Uuid,
    pub industry: String,
    pub insights: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoadmapRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub roadmap: Value,
    pub created_at: DateTime<Utc>,
}
