//! Client state endpoints

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};

use super::ApiResponse;
use crate::api::websocket::state::AppState;

/// GET /api/state - Events, stats and online flag in one read
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (version, snapshot) = state.client.versioned_snapshot();
    Json(ApiResponse::new(snapshot, version))
}

/// GET /api/events - Current event log, oldest first
pub async fn get_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (version, snapshot) = state.client.versioned_snapshot();
    Json(ApiResponse::new(snapshot.events, version))
}

/// GET /api/stats - Current aggregate stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (version, snapshot) = state.client.versioned_snapshot();
    Json(ApiResponse::new(snapshot.stats, version))
}
