pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview quiz
        .route("/api/v1/quiz", post(handlers::handle_generate_quiz))
        .route("/api/v1/quiz/:id/submit", post(handlers::handle_submit_quiz))
        // ATS resume analysis
        .route("/api/v1/ats/analyze", post(handlers::handle_ats_analyze))
        // Cover letters
        .route(
            "/api/v1/cover-letters",
            post(handlers::handle_create_cover_letter).get(handlers::handle_list_cover_letters),
        )
        // Industry insights (cached per industry)
        .route("/api/v1/insights", post(handlers::handle_insights))
        // Career roadmaps
        .route(
            "/api/v1/roadmaps",
            post(handlers::handle_create_roadmap).get(handlers::handle_list_roadmaps),
        )
        .with_state(state)
}
