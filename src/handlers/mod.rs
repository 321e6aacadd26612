//! JSON API handlers.

pub mod answers;
pub mod items;
pub mod sessions;
pub mod stats;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};

use crate::state::{AppState, EngineLockError};

pub use answers::{submit_answer, submit_confidence};
pub use items::{delete_book, export_items, import_items};
pub use sessions::create_session;
pub use stats::{
    stats_bias, stats_confusions, stats_fading, stats_overview, stats_skills, stats_time_of_day,
    stats_topics,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/items/import", post(import_items))
        .route("/items/export", get(export_items))
        .route("/books/{book_id}", delete(delete_book))
        .route("/answers", post(submit_answer))
        .route("/answers/confidence", post(submit_confidence))
        .route("/sessions", post(create_session))
        .route("/stats/overview", get(stats_overview))
        .route("/stats/topics", get(stats_topics))
        .route("/stats/skills", get(stats_skills))
        .route("/stats/confusions", get(stats_confusions))
        .route("/stats/bias", get(stats_bias))
        .route("/stats/time-of-day", get(stats_time_of_day))
        .route("/stats/fading", get(stats_fading))
        .with_state(state)
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

impl IntoResponse for EngineLockError {
    fn into_response(self) -> Response {
        error_response(StatusCode::SERVICE_UNAVAILABLE, &self.to_string())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum_test::TestServer;

    use super::router;
    use crate::domain::Item;
    use crate::engine::StudyEngine;
    use crate::state::AppState;
    use crate::store::MemoryStore;

    pub fn server_with(items: Vec<Item>) -> TestServer {
        let mut engine = StudyEngine::new(MemoryStore::new(), 300);
        engine.import_items(items);
        TestServer::new(router(AppState::new(engine))).unwrap()
    }
}
