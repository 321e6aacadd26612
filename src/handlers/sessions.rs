use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::selection::{SessionFilter, SessionMode};
use crate::state::AppState;

const DEFAULT_SESSION_SIZE: i64 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Requested item count; negative values mean zero
    #[serde(default = "default_count")]
    pub count: i64,
    #[serde(flatten)]
    pub mode: SessionMode,
    #[serde(default)]
    pub filter: SessionFilter,
}

fn default_count() -> i64 {
    DEFAULT_SESSION_SIZE
}

/// Assemble a practice session.
///
/// POST /sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> impl IntoResponse {
    let target = request.count.max(0) as usize;

    let engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => return e.into_response(),
    };
    let plan = engine.request_session(target, &request.mode, &request.filter, Utc::now());
    (StatusCode::OK, Json(plan)).into_response()
}
