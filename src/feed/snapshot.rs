//! One-shot snapshot load of recent events and stats

use tracing::{info, warn};

use crate::backend::BackendClient;
use crate::state::ClientState;
use crate::types::Event;

/// Result of a snapshot load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// State replaced with this many events
    Loaded { events: usize },
    /// A read failed; state left untouched
    Failed,
}

/// Loads the initial state from `/api/events` and `/api/stats`
pub struct SnapshotLoader {
    client: BackendClient,
    limit: usize,
}

impl SnapshotLoader {
    pub fn new(client: BackendClient, limit: usize) -> Self {
        Self { client, limit }
    }

    /// Fetch both reads concurrently and replace the state wholesale.
    ///
    /// Failures are logged and leave `state` as it was. No retry is scheduled.
    pub async fn load(&self, state: &ClientState) -> SnapshotOutcome {
        let (events, stats) = tokio::join!(
            self.client.fetch_events(self.limit),
            self.client.fetch_stats()
        );

        let (events, stats) = match (events, stats) {
            (Ok(events), Ok(stats)) => (events, stats),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, transient = e.is_transient(), "failed to fetch initial snapshot");
                return SnapshotOutcome::Failed;
            }
        };

        let events = oldest_first(events);
        let count = events.len();
        state.replace_snapshot(events, stats);
        info!(events = count, "snapshot loaded");
        SnapshotOutcome::Loaded { events: count }
    }
}

/// The backend serves history newest-first; the log wants oldest-first.
///
/// Decided by the first and last parseable timestamps. When those are missing or equal,
/// the backend row ids (`ORDER BY id DESC`) decide. Otherwise the order is kept as served.
fn oldest_first(mut events: Vec<Event>) -> Vec<Event> {
    let descending = direction(endpoints(&events, Event::occurred_at))
        .or_else(|| direction(endpoints(&events, |e| e.id)));
    if descending == Some(true) {
        events.reverse();
    }
    events
}

/// `Some(true)` for descending endpoints, `None` when they do not decide
fn direction<K: PartialOrd>(endpoints: Option<(K, K)>) -> Option<bool> {
    let (first, last) = endpoints?;
    (first != last).then_some(first > last)
}

/// First and last values of `key` across `events`, skipping events where it is absent
fn endpoints<K>(events: &[Event], key: impl Fn(&Event) -> Option<K>) -> Option<(K, K)> {
    let first = events.iter().find_map(&key)?;
    let last = events.iter().rev().find_map(&key)?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn event(ts: &str) -> Event {
        with_id(ts, None)
    }

    fn with_id(ts: &str, id: Option<u64>) -> Event {
        Event {
            id,
            timestamp: ts.to_string(),
            severity: Severity::Info,
            event_type: "TEST".to_string(),
            process_name: "p".to_string(),
            pid: 1,
            parent_pid: 0,
            details: String::new(),
        }
    }

    fn stamps(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.timestamp.as_str()).collect()
    }

    #[test]
    fn test_descending_history_is_reversed() {
        let events = vec![
            event("2026-01-04T10:00:03"),
            event("2026-01-04T10:00:02"),
            event("2026-01-04T10:00:01"),
        ];
        let ordered = oldest_first(events);
        assert_eq!(
            stamps(&ordered),
            vec!["2026-01-04T10:00:01", "2026-01-04T10:00:02", "2026-01-04T10:00:03"]
        );
    }

    #[test]
    fn test_ascending_history_is_kept() {
        let events = vec![event("100"), event("200"), event("300")];
        assert_eq!(stamps(&oldest_first(events)), vec!["100", "200", "300"]);
    }

    #[test]
    fn test_ids_decide_when_timestamps_cannot() {
        // Same second for the whole page
        let events = vec![
            with_id("2026-01-04 10:00:00", Some(9)),
            with_id("2026-01-04 10:00:00", Some(8)),
            with_id("2026-01-04 10:00:00", Some(7)),
        ];
        let ids: Vec<Option<u64>> = oldest_first(events).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(7), Some(8), Some(9)]);

        // No usable timestamps at all
        let events = vec![with_id("", Some(2)), with_id("garbage", Some(1))];
        let ids: Vec<Option<u64>> = oldest_first(events).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_timestamps_take_precedence_over_ids() {
        let events = vec![with_id("100", Some(1)), with_id("200", Some(2))];
        let ids: Vec<Option<u64>> = oldest_first(events).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_unparseable_timestamps_keep_order() {
        let events = vec![event("b"), event("a")];
        assert_eq!(stamps(&oldest_first(events)), vec!["b", "a"]);
    }
}
