//! Consumer relay: HTTP and WebSocket endpoints
//!
//! Re-exposes the client state to out-of-process consumers such as the dashboard.

pub mod http;
pub mod rest;
pub mod websocket;

pub use http::{create_router, serve};
pub use websocket::AppState;
