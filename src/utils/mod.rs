//! Utility functions and helpers
//!
//! This module contains timestamp parsing shared by the event types and the snapshot loader.

pub mod time;

pub use time::parse_event_timestamp;
