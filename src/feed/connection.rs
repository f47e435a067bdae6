//! Live feed connection state machine
//!
//! Transport callbacks (open, message, close, error) are turned into [`FeedSignal`]s and
//! run through [`ConnectionState::on`], which returns the next state plus the [`Action`]
//! the driver must perform. Policy (reconnect, online flag) lives here, not in the
//! transport binding.
//!
//! ```text
//! Disconnected --Connect--------------> Connecting    (OpenConnection)
//! Connecting   --HandshakeSucceeded---> Connected     (GoOnline)
//! Connecting   --HandshakeFailed------> Disconnected  (ScheduleReconnect)
//! Connected    --Message--------------> Connected     (ApplyMessage)
//! Connected    --Closed---------------> Disconnected  (GoOfflineAndReconnect)
//! any          --Shutdown-------------> Disconnected  (Teardown)
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSignal {
    /// A connection attempt is issued (start, or reconnect timer fired)
    Connect,
    HandshakeSucceeded,
    /// Handshake failed, or the connection closed before opening
    HandshakeFailed,
    /// A frame arrived on the open connection
    Message,
    /// The open connection ended, for any reason
    Closed,
    /// Explicit teardown by the owner
    Shutdown,
}

/// What the driver has to do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    OpenConnection,
    GoOnline,
    ApplyMessage,
    /// Arm the reconnect timer; the feed was never online
    ScheduleReconnect,
    /// Flip the online flag off and arm the reconnect timer
    GoOfflineAndReconnect,
    /// Close the socket, cancel the timer, flip the online flag off
    Teardown,
}

impl ConnectionState {
    /// Transition table. Signals that make no sense in the current state are ignored.
    pub fn on(self, signal: FeedSignal) -> (ConnectionState, Action) {
        use ConnectionState::*;
        use FeedSignal::*;

        match (self, signal) {
            (_, Shutdown) => (Disconnected, Action::Teardown),
            (Disconnected, Connect) => (Connecting, Action::OpenConnection),
            (Connecting, HandshakeSucceeded) => (Connected, Action::GoOnline),
            (Connecting, HandshakeFailed) => (Disconnected, Action::ScheduleReconnect),
            (Connected, Message) => (Connected, Action::ApplyMessage),
            (Connected, Closed) => (Disconnected, Action::GoOfflineAndReconnect),
            (state, _) => (state, Action::None),
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}
