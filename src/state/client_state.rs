//! Shared client state with push-based change notification

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::event_log::EventLog;
use crate::types::{AggregateStats, Event};

/// Notification buffer per subscriber; slower subscribers lag and must re-read the state
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Point-in-time copy of the client state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Oldest first
    pub events: Vec<Event>,
    pub stats: AggregateStats,
    pub online: bool,
}

/// What caused a state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateChange {
    /// Log and stats were replaced from a REST snapshot
    SnapshotLoaded { event_count: usize },
    /// A live event was appended
    EventAppended { event: Event },
    /// The live feed went online or offline
    ConnectionChanged,
}

/// Pushed to every subscriber on each mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub change: StateChange,
    /// Monotonically increasing per mutation
    pub version: u64,
    pub state: StateSnapshot,
}

struct Inner {
    log: EventLog,
    stats: AggregateStats,
    online: bool,
    version: u64,
}

/// Event log, aggregate stats and the online flag
///
/// Only the snapshot loader and the live feed client mutate it; everyone else reads a
/// copy or subscribes to updates.
pub struct ClientState {
    inner: RwLock<Inner>,
    tx: broadcast::Sender<StateUpdate>,
}

impl ClientState {
    pub fn new(log_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: RwLock::new(Inner {
                log: EventLog::with_capacity(log_capacity),
                stats: AggregateStats::default(),
                online: false,
                version: 0,
            }),
            tx,
        }
    }

    /// Subscribe to state changes. Each subscriber gets every update independently.
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.read();
        Self::snapshot_of(&inner)
    }

    /// Snapshot together with the version it was taken at, read under one lock
    pub fn versioned_snapshot(&self) -> (u64, StateSnapshot) {
        let inner = self.inner.read();
        (inner.version, Self::snapshot_of(&inner))
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner.read().log.to_vec()
    }

    pub fn stats(&self) -> AggregateStats {
        self.inner.read().stats.clone()
    }

    pub fn is_online(&self) -> bool {
        self.inner.read().online
    }

    pub fn event_count(&self) -> usize {
        self.inner.read().log.len()
    }

    pub fn log_capacity(&self) -> usize {
        self.inner.read().log.capacity()
    }

    /// Number of mutations applied so far
    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    pub fn find_event(&self, id: u64) -> Option<Event> {
        self.inner.read().log.find_by_id(id).cloned()
    }

    /// Replace log and stats wholesale (no merge)
    pub(crate) fn replace_snapshot(&self, events: Vec<Event>, stats: AggregateStats) {
        let mut inner = self.inner.write();
        let event_count = events.len();
        inner.log.replace(events);
        inner.stats = stats;
        self.commit(&mut inner, StateChange::SnapshotLoaded { event_count });
    }

    /// Append one live event and account for it in the stats
    pub(crate) fn apply_live_event(&self, event: Event) {
        let mut inner = self.inner.write();
        inner.stats.record(&event);
        inner.log.push(event.clone());
        self.commit(&mut inner, StateChange::EventAppended { event });
    }

    /// Update the online flag; a no-op when unchanged
    pub(crate) fn set_online(&self, online: bool) {
        let mut inner = self.inner.write();
        if inner.online == online {
            return;
        }
        inner.online = online;
        self.commit(&mut inner, StateChange::ConnectionChanged);
    }

    /// Bump the version and notify while still holding the write lock, so subscribers see
    /// updates in mutation order.
    fn commit(&self, inner: &mut Inner, change: StateChange) {
        inner.version += 1;
        if self.tx.receiver_count() == 0 {
            return;
        }
        let update = StateUpdate {
            change,
            version: inner.version,
            state: Self::snapshot_of(inner),
        };
        // Ignore send errors - they just mean the last subscriber went away
        let _ = self.tx.send(update);
    }

    fn snapshot_of(inner: &Inner) -> StateSnapshot {
        StateSnapshot {
            events: inner.log.to_vec(),
            stats: inner.stats.clone(),
            online: inner.online,
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn event(pid: i64, severity: Severity) -> Event {
        Event {
            id: None,
            timestamp: pid.to_string(),
            severity,
            event_type: "TEST".to_string(),
            process_name: "proc".to_string(),
            pid,
            parent_pid: 0,
            details: String::new(),
        }
    }

    #[test]
    fn test_initial_state_is_empty_and_offline() {
        let state = ClientState::new(10);
        let snap = state.snapshot();
        assert!(snap.events.is_empty());
        assert_eq!(snap.stats.total_events(), 0);
        assert!(!snap.online);
        assert_eq!(state.version(), 0);
    }

    #[test]
    fn test_apply_live_event_updates_log_and_stats() {
        let state = ClientState::new(10);
        state.apply_live_event(event(1, Severity::High));
        state.apply_live_event(event(2, Severity::Medium));
        state.apply_live_event(event(3, Severity::Info));

        let stats = state.stats();
        assert_eq!(state.event_count(), 3);
        assert_eq!(stats.total_events(), 3);
        assert_eq!(stats.high_severity(), 1);
        assert_eq!(stats.medium_severity(), 1);
    }

    #[test]
    fn test_snapshot_overwrites_without_merge() {
        let state = ClientState::new(100);
        for pid in 100..103 {
            state.apply_live_event(event(pid, Severity::Info));
        }

        let fresh: Vec<Event> = (0..5).map(|pid| event(pid, Severity::High)).collect();
        let stats: AggregateStats = [("total_events".to_string(), 5)].into_iter().collect();
        state.replace_snapshot(fresh.clone(), stats.clone());

        assert_eq!(state.events(), fresh);
        assert_eq!(state.stats(), stats);
    }

    #[tokio::test]
    async fn test_subscribers_receive_updates_in_order() {
        let state = ClientState::new(10);
        let mut first = state.subscribe();
        let mut second = state.subscribe();

        state.set_online(true);
        state.apply_live_event(event(7, Severity::High));

        for rx in [&mut first, &mut second] {
            let update = rx.recv().await.unwrap();
            assert_eq!(update.change, StateChange::ConnectionChanged);
            assert!(update.state.online);

            let update = rx.recv().await.unwrap();
            assert_eq!(update.version, 2);
            assert!(matches!(update.change, StateChange::EventAppended { ref event } if event.pid == 7));
            assert_eq!(update.state.events.len(), 1);
            assert_eq!(update.state.stats.high_severity(), 1);
        }
    }

    #[test]
    fn test_set_online_is_noop_when_unchanged() {
        let state = ClientState::new(10);
        state.set_online(false);
        assert_eq!(state.version(), 0);
        state.set_online(true);
        state.set_online(true);
        assert_eq!(state.version(), 1);
    }
}
