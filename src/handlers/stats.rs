//! Read-only dashboard stats, all served through the engine's caches.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;

use crate::engine::StudyEngine;
use crate::state::AppState;

fn respond<T: Serialize>(state: &AppState, read: impl FnOnce(&mut StudyEngine) -> T) -> axum::response::Response {
    match state.engine() {
        Ok(mut engine) => (StatusCode::OK, Json(read(&mut *engine))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /stats/overview
pub async fn stats_overview(State(state): State<AppState>) -> impl IntoResponse {
    respond(&state, |engine| engine.overview(Utc::now()))
}

/// GET /stats/topics
pub async fn stats_topics(State(state): State<AppState>) -> impl IntoResponse {
    respond(&state, |engine| engine.topics(Utc::now()))
}

/// GET /stats/skills
pub async fn stats_skills(State(state): State<AppState>) -> impl IntoResponse {
    respond(&state, |engine| engine.skills(Utc::now()))
}

/// GET /stats/confusions
pub async fn stats_confusions(State(state): State<AppState>) -> impl IntoResponse {
    respond(&state, |engine| engine.confusions(Utc::now()))
}

/// GET /stats/bias
pub async fn stats_bias(State(state): State<AppState>) -> impl IntoResponse {
    respond(&state, |engine| engine.option_bias(Utc::now()))
}

/// GET /stats/time-of-day
pub async fn stats_time_of_day(State(state): State<AppState>) -> impl IntoResponse {
    respond(&state, |engine| engine.time_of_day(Utc::now()))
}

/// GET /stats/fading
pub async fn stats_fading(State(state): State<AppState>) -> impl IntoResponse {
    respond(&state, |engine| engine.fading(Utc::now()))
}
