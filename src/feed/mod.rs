//! Live feed ingestion
//!
//! - `snapshot`: one-shot REST load of recent events and stats
//! - `connection`: connection state machine (transition table)
//! - `transport`: WebSocket and in-process transport bindings
//! - `client`: the feed client driving the state machine
//!
//! ```text
//! ┌───────────────┐  replace   ┌─────────────┐  StateUpdate  ┌───────────┐
//! │SnapshotLoader │──────────►│ ClientState │──────────────►│ consumers │
//! └───────────────┘            └─────────────┘               └───────────┘
//! ┌───────────────┐  append + count  ▲
//! │LiveFeedClient │──────────────────┘
//! └───────────────┘
//! ```

mod client;
mod connection;
mod snapshot;
mod transport;

pub use client::LiveFeedClient;
pub use connection::{Action, ConnectionState, FeedSignal};
pub use snapshot::{SnapshotLoader, SnapshotOutcome};
pub use transport::{
    ChannelBackend, ChannelConnection, ChannelPeer, ChannelTransport, FeedConnection, FeedFrame,
    FeedTransport, WsConnection, WsTransport,
};
