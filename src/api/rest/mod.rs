//! REST API module for relay HTTP endpoints
//!
//! - `GET /api/state` - Events, stats and online flag
//! - `GET /api/events` - Current event log, oldest first
//! - `GET /api/stats` - Current aggregate stats
//! - `GET /api/events/:id/analysis` - Event selection pass-through to the backend

pub mod analysis;
pub mod state;

use serde::Serialize;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Client state version the data was read at
    pub version: u64,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, version: u64) -> Self {
        Self { data, version }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "NOT_FOUND".to_string(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "BAD_GATEWAY".to_string(),
        }
    }
}
