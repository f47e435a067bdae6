//! Client-side state: bounded event log, aggregate stats and connection flag

mod client_state;
mod event_log;

pub use client_state::{ClientState, StateChange, StateSnapshot, StateUpdate};
pub use event_log::EventLog;
