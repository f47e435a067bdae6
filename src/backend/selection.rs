//! Event selection: forwards a chosen event to the analysis lookup

use tracing::debug;

use super::client::BackendClient;
use crate::error::FeedResult;
use crate::types::{Event, EventAnalysis};

/// The event a consumer selected, together with its backend analysis
#[derive(Debug, Clone)]
pub struct Selection {
    /// Forwarded unmodified
    pub event: Event,
    /// `None` when the event has no backend id to look up
    pub analysis: Option<EventAnalysis>,
}

/// Resolve the detail view for a selected event.
///
/// Events without an `id` (e.g. synthesized alerts) issue no request.
pub async fn select_event(client: &BackendClient, event: Event) -> FeedResult<Selection> {
    let analysis = match event.id {
        Some(id) => Some(client.fetch_analysis(id).await?),
        None => {
            debug!(pid = event.pid, "selected event has no id, skipping analysis");
            None
        }
    };
    Ok(Selection { event, analysis })
}
