//! Event selection endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use super::ApiError;
use crate::api::websocket::state::AppState;
use crate::backend::select_event;
use crate::error::FeedError;
use crate::types::{Event, EventAnalysis};

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    /// The selected event, when it is still in the client log
    pub event: Option<Event>,
    pub analysis: Option<EventAnalysis>,
}

/// GET /api/events/:id/analysis - Forward a selected event to the backend analysis lookup
pub async fn get_event_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Response {
    let result = match state.client.find_event(id) {
        Some(event) => select_event(&state.backend, event)
            .await
            .map(|selection| SelectionResponse {
                event: Some(selection.event),
                analysis: selection.analysis,
            }),
        None => state
            .backend
            .fetch_analysis(id)
            .await
            .map(|analysis| SelectionResponse {
                event: None,
                analysis: Some(analysis),
            }),
    };

    match result {
        Ok(selection) => Json(selection).into_response(),
        Err(FeedError::NotFound(what)) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("{} not found", what))),
        )
            .into_response(),
        Err(e) => {
            warn!(event_id = id, error = %e, "analysis lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiError::bad_gateway(e.to_string())),
            )
                .into_response()
        }
    }
}
