// Plain HTTP routes next to the websocket.

use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    // Name of the policy backing the loop ("none" when heuristic-only).
    pub policy: String,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        policy: state.control.policy_name.to_string(),
    })
}
