//! Messages exchanged with relay WebSocket consumers

use serde::{Deserialize, Serialize};

use crate::state::{StateChange, StateSnapshot, StateUpdate};

/// Server -> consumer messages
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    /// Full state, sent on connect and after a lag
    State {
        version: u64,
        #[serde(flatten)]
        state: StateSnapshot,
    },

    /// One state change
    Update {
        change: StateChange,
        version: u64,
        #[serde(flatten)]
        state: StateSnapshot,
    },

    Error { code: String, message: String },

    Pong,
}

impl RelayMessage {
    pub fn state(version: u64, state: StateSnapshot) -> Self {
        RelayMessage::State { version, state }
    }

    pub fn lagged(missed: u64) -> Self {
        RelayMessage::Error {
            code: "lagged".to_string(),
            message: format!("Missed {} updates, resending state", missed),
        }
    }
}

impl From<StateUpdate> for RelayMessage {
    fn from(update: StateUpdate) -> Self {
        RelayMessage::Update {
            change: update.change,
            version: update.version,
            state: update.state,
        }
    }
}

/// Consumer -> server messages
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat
    Ping,

    /// Ask for the full state again
    Resync,
}
