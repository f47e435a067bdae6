//! WebSocket relay for state-change notifications
//!
//! Provides `/ws`: on connect the consumer receives the full state, then one message per
//! state change. Consumers that fall behind get a `lagged` error followed by the full state.

pub mod events;
pub mod handler;
pub mod state;

pub use events::{ClientMessage, RelayMessage};
pub use state::AppState;
