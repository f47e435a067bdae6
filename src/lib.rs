//! SecMon Feed
//!
//! Client-side ingestion for the Kernel SecMon backend: loads a snapshot of recent
//! security events, follows the live WebSocket feed, and keeps a bounded event log plus
//! aggregate counters that any number of consumers can subscribe to.
//!
//! # Features
//!
//! - **Snapshot load**: `/api/events` and `/api/stats` fetched concurrently, state replaced wholesale
//! - **Live feed**: explicit connection state machine, fixed-delay reconnect, clean teardown
//! - **Bounded log**: FIFO eviction at capacity (default 100)
//! - **Push updates**: broadcast of every state change
//! - **Relay**: HTTP/WebSocket endpoints re-exposing the state to dashboards
//!
//! # Modules
//!
//! - `types`: Event, severity, aggregate stats and backend payloads
//! - `state`: Event log and shared client state
//! - `feed`: Snapshot loader, connection state machine, transports, live feed client
//! - `backend`: REST client and event selection
//! - `api`: Consumer relay (REST + WebSocket)
//! - `config`: Environment-driven configuration
//! - `utils`: Timestamp helpers
//!
//! # Example
//!
//! ```no_run
//! use secmon_feed::{FeedConfig, Monitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), secmon_feed::FeedError> {
//!     let config = FeedConfig::from_env()?;
//!     let monitor = Monitor::from_config(&config)?;
//!     let mut updates = monitor.state().subscribe();
//!     monitor.start().await;
//!
//!     while let Ok(update) = updates.recv().await {
//!         println!("{} events, online: {}", update.state.events.len(), update.state.online);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod feed;
pub mod monitor;
pub mod state;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use backend::{BackendClient, Selection};
pub use config::FeedConfig;
pub use error::{FeedError, FeedResult};
pub use feed::{ConnectionState, LiveFeedClient, SnapshotLoader, SnapshotOutcome};
pub use monitor::Monitor;
pub use state::{ClientState, StateChange, StateSnapshot, StateUpdate};
pub use types::{AggregateStats, Event, Severity};
