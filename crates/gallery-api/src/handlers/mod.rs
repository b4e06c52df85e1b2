//! HTTP handlers for gallery-api.

pub mod galleries;
pub mod library;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// `GET /api`
pub async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": state.site_name,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
