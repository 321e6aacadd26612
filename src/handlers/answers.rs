use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::error_response;
use crate::domain::{AttemptOutcome, Confidence, Item};
use crate::state::AppState;

// ============================================================================
// Answer submission
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub item: Item,
    pub due_in_days: f64,
}

/// Record an answer and return the rescheduled item.
///
/// POST /answers
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(outcome): Json<AttemptOutcome>,
) -> impl IntoResponse {
    let mut engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => return e.into_response(),
    };

    match engine.submit_answer(&outcome, Utc::now()) {
        Some(item) => {
            let due_in_days = item.srs_interval;
            (StatusCode::OK, Json(AnswerResponse { item, due_in_days })).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "Item not found"),
    }
}

// ============================================================================
// Confidence
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceRequest {
    pub item_id: String,
    pub confidence: Confidence,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceResponse {
    pub item: Item,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Apply a confidence signal to the item's last answer.
///
/// POST /answers/confidence
pub async fn submit_confidence(
    State(state): State<AppState>,
    Json(request): Json<ConfidenceRequest>,
) -> impl IntoResponse {
    let mut engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => return e.into_response(),
    };

    match engine.submit_confidence(&request.item_id, request.confidence, Utc::now()) {
        Some(adjustment) => (
            StatusCode::OK,
            Json(ConfidenceResponse {
                item: adjustment.item,
                applied: adjustment.applied,
                message: adjustment.message,
            }),
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Item not found"),
    }
}
