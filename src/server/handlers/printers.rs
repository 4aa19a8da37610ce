//! Printer listing.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::super::state::AppState;

/// GET /api/printers - Every configured printer, physical first.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "printers": state.printers.list() }))
}
