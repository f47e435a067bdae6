//! Aggregate counters summarizing the event population

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Event, Severity};

pub const TOTAL_EVENTS: &str = "total_events";
pub const HIGH_SEVERITY: &str = "high_severity";
pub const MEDIUM_SEVERITY: &str = "medium_severity";
pub const SUSPICIOUS_PROCESSES: &str = "suspicious_processes";

/// Counter name -> count, as served by `/api/stats`
///
/// Unknown counters reported by the server are kept as-is. Client-side updates only
/// ever increment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateStats {
    counters: BTreeMap<String, u64>,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a counter, 0 when the server never reported it
    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn total_events(&self) -> u64 {
        self.get(TOTAL_EVENTS)
    }

    pub fn high_severity(&self) -> u64 {
        self.get(HIGH_SEVERITY)
    }

    pub fn medium_severity(&self) -> u64 {
        self.get(MEDIUM_SEVERITY)
    }

    pub fn suspicious_processes(&self) -> u64 {
        self.get(SUSPICIOUS_PROCESSES)
    }

    /// Account for one streamed event
    ///
    /// Bumps `total_events` and the counter matching the event severity.
    pub fn record(&mut self, event: &Event) {
        self.increment(TOTAL_EVENTS);
        if let Some(name) = event.severity.counter_name() {
            self.increment(name);
        }
    }

    /// Count of events at a given severity, if that severity has a named counter
    pub fn for_severity(&self, severity: Severity) -> Option<u64> {
        severity.counter_name().map(|name| self.get(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn increment(&mut self, name: &str) {
        let counter = self.counters.entry(name.to_string()).or_insert(0);
        *counter = counter.saturating_add(1);
    }
}

impl FromIterator<(String, u64)> for AggregateStats {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            counters: iter.into_iter().collect(),
        }
    }
}
