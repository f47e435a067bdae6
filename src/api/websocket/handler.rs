//! Relay WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tokio::sync::broadcast;
use tracing::debug;

use super::events::{ClientMessage, RelayMessage};
use super::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Stream state updates to one consumer
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the state so no update falls in between
    let mut rx = state.subscribe();
    let mut gate = VersionGate::default();

    if !send_full_state(&mut socket, &state, &mut gate).await {
        return; // Consumer disconnected immediately
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(update) => {
                        // Already covered by a full state sent after it was queued
                        if !gate.admit(update.version) {
                            continue;
                        }
                        if !send(&mut socket, &RelayMessage::from(update)).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(missed = n, "relay consumer lagged");
                        if !send(&mut socket, &RelayMessage::lagged(n)).await
                            || !send_full_state(&mut socket, &state, &mut gate).await
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(msg)) => {
                        if !handle_client_message(msg, &mut socket, &state, &mut gate).await {
                            break;
                        }
                    }
                    Some(Err(_)) => break,
                    None => break,
                }
            }
        }
    }
}

/// Highest state version sent to one consumer; older updates are not forwarded
#[derive(Debug, Default)]
struct VersionGate {
    last_sent: u64,
}

impl VersionGate {
    /// Record `version` as sent if it is newer than anything sent so far
    fn admit(&mut self, version: u64) -> bool {
        if version <= self.last_sent {
            return false;
        }
        self.last_sent = version;
        true
    }
}

/// Handle a message from the consumer.
/// Returns false if the connection should be closed
async fn handle_client_message(
    msg: Message,
    socket: &mut WebSocket,
    state: &AppState,
    gate: &mut VersionGate,
) -> bool {
    match msg {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Ping) => send(socket, &RelayMessage::Pong).await,
            Ok(ClientMessage::Resync) => send_full_state(socket, state, gate).await,
            Err(_) => true, // Ignore unknown messages
        },
        Message::Binary(_) => true,
        Message::Ping(data) => socket.send(Message::Pong(data)).await.is_ok(),
        Message::Pong(_) => true,
        Message::Close(_) => false,
    }
}

/// Send the full state. A resync at an unchanged version is still sent.
async fn send_full_state(socket: &mut WebSocket, state: &AppState, gate: &mut VersionGate) -> bool {
    let (version, snapshot) = state.client.versioned_snapshot();
    gate.admit(version);
    let msg = RelayMessage::state(version, snapshot);
    send(socket, &msg).await
}

async fn send(socket: &mut WebSocket, msg: &RelayMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(_) => true,
    }
}
