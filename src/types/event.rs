//! Security event types delivered by the backend
//!
//! An [`Event`] is one detected security occurrence. The same shape is used by the
//! `/api/events` snapshot array and by every message on the live feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::parse_event_timestamp;

/// Severity level reported by the kernel monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Info,
    /// Any level the backend emits that this client does not know about
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Name of the aggregate counter bumped by an event of this severity, if any.
    ///
    /// INFO and unknown levels only count toward `total_events`.
    pub fn counter_name(&self) -> Option<&'static str> {
        match self {
            Severity::High => Some(super::stats::HIGH_SEVERITY),
            Severity::Medium => Some(super::stats::MEDIUM_SEVERITY),
            Severity::Info | Severity::Unknown => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Info => write!(f, "INFO"),
            Severity::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// An immutable security event
///
/// Only `type`, `severity` and `details` are mandatory. Alerts synthesized by the backend
/// (`SECURITY_ALERT`, `RESPONSE_ACTION`, `BEHAVIORAL_ANOMALY`) carry no process and
/// sometimes no timestamp; those fields then default to empty / 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Backend row id, only present on events that can be looked up for analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Raw timestamp as emitted by the collector (RFC 3339, naive ISO-8601 or epoch seconds)
    #[serde(default)]
    pub timestamp: String,

    pub severity: Severity,

    /// Category label, e.g. `PRIV_ESC`, `HIDDEN_PROCESS`
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub process_name: String,

    #[serde(default)]
    pub pid: i64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub parent_pid: i64,

    pub details: String,
}

fn is_zero(val: &i64) -> bool {
    *val == 0
}

impl Event {
    /// Decode a single live-feed message
    pub fn from_message(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Parsed form of [`Event::timestamp`], if it is in a recognised format
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        parse_event_timestamp(&self.timestamp)
    }
}
