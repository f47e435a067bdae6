//! Wires the snapshot loader, live feed and client state together

use std::sync::Arc;

use crate::backend::{select_event, BackendClient, Selection};
use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::feed::{FeedTransport, LiveFeedClient, SnapshotLoader, SnapshotOutcome, WsTransport};
use crate::state::ClientState;

/// A ready-to-run ingestion pipeline
pub struct Monitor<T: FeedTransport = WsTransport> {
    state: Arc<ClientState>,
    backend: BackendClient,
    loader: SnapshotLoader,
    feed: LiveFeedClient<T>,
}

impl Monitor<WsTransport> {
    pub fn from_config(config: &FeedConfig) -> FeedResult<Self> {
        let transport = WsTransport::new(config.ws_url.clone());
        Self::with_transport(config, transport)
    }
}

impl<T: FeedTransport> Monitor<T> {
    /// Pipeline using a custom feed transport
    pub fn with_transport(config: &FeedConfig, transport: T) -> FeedResult<Self> {
        let state = Arc::new(ClientState::new(config.log_capacity));
        let backend = BackendClient::from_config(config)?;
        let loader = SnapshotLoader::new(backend.clone(), config.snapshot_limit);
        let feed = LiveFeedClient::new(transport, Arc::clone(&state), config.reconnect_delay)
            .with_connect_timeout(config.connect_timeout);
        Ok(Self {
            state,
            backend,
            loader,
            feed,
        })
    }

    pub fn state(&self) -> &Arc<ClientState> {
        &self.state
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn feed(&self) -> &LiveFeedClient<T> {
        &self.feed
    }

    /// Load the snapshot, then start the live feed.
    ///
    /// A failed snapshot does not prevent the feed from starting.
    pub async fn start(&self) -> SnapshotOutcome {
        let outcome = self.loader.load(&self.state).await;
        self.feed.start();
        outcome
    }

    /// Re-run the snapshot load; the caller decides when to retry
    pub async fn reload_snapshot(&self) -> SnapshotOutcome {
        self.loader.load(&self.state).await
    }

    pub async fn stop(&self) {
        self.feed.stop().await;
    }

    /// Resolve the detail view for an event currently in the log
    pub async fn select(&self, event_id: u64) -> FeedResult<Selection> {
        let event = self
            .state
            .find_event(event_id)
            .ok_or_else(|| FeedError::NotFound(format!("event {} in client log", event_id)))?;
        select_event(&self.backend, event).await
    }
}
