use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::Item;
use crate::state::AppState;
use crate::store;

/// Items arrive either as a list or as the flat id -> item map
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImportRequest {
    List(Vec<Item>),
    Keyed(BTreeMap<String, Item>),
}

impl ImportRequest {
    fn into_items(self) -> Vec<Item> {
        match self {
            Self::List(items) => items,
            Self::Keyed(map) => store::from_keyed_map(map),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBookResponse {
    pub book_id: String,
    pub removed: Vec<String>,
}

/// POST /items/import
pub async fn import_items(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> impl IntoResponse {
    let items: Vec<Item> = request
        .into_items()
        .into_iter()
        .filter(|i| !i.id.is_empty())
        .collect();

    let mut engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => return e.into_response(),
    };
    let summary = engine.import_items(items);
    (StatusCode::OK, Json(summary)).into_response()
}

/// Every item as the flat id -> item map used for sync
///
/// GET /items/export
pub async fn export_items(State(state): State<AppState>) -> impl IntoResponse {
    let engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => return e.into_response(),
    };
    (StatusCode::OK, Json(store::to_keyed_map(engine.items()))).into_response()
}

/// DELETE /books/{book_id}
pub async fn delete_book(State(state): State<AppState>, Path(book_id): Path<String>) -> impl IntoResponse {
    let mut engine = match state.engine() {
        Ok(engine) => engine,
        Err(e) => return e.into_response(),
    };
    let removed = engine.remove_book(&book_id);
    (StatusCode::OK, Json(DeleteBookResponse { book_id, removed })).into_response()
}
