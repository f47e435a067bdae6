//! Relay application state

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::backend::BackendClient;
use crate::state::{ClientState, StateUpdate};

/// Shared state for relay handlers
pub struct AppState {
    /// Client state fed by the snapshot loader and the live feed
    pub client: Arc<ClientState>,

    /// Backend used for event-selection lookups
    pub backend: BackendClient,
}

impl AppState {
    pub fn new(client: Arc<ClientState>, backend: BackendClient) -> Self {
        Self { client, backend }
    }

    /// Current state version, used by consumers to detect missed updates
    pub fn current_version(&self) -> u64 {
        self.client.version()
    }

    /// Subscribe to client state changes
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.client.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;

    #[tokio::test]
    async fn test_subscribe_sees_client_updates() {
        let client = Arc::new(ClientState::new(10));
        let backend =
            BackendClient::new(Url::parse("http://127.0.0.1:9").unwrap(), Duration::from_secs(1))
                .unwrap();
        let state = AppState::new(Arc::clone(&client), backend);
        let mut rx = state.subscribe();

        assert_eq!(state.current_version(), 0);
        client.set_online(true);

        let update = rx.recv().await.unwrap();
        assert_eq!(update.version, 1);
        assert_eq!(state.current_version(), 1);
    }
}
