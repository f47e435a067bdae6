//! Bounded, insertion-ordered event log

use std::collections::VecDeque;

use crate::types::Event;

/// FIFO log of the most recent events, oldest first
///
/// Appending beyond capacity evicts from the head. Stored events are never rewritten.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: usize,
}

impl EventLog {
    /// Create an empty log. A zero capacity is bumped to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append one event, evicting the oldest if the log is full.
    ///
    /// Returns the evicted event, if any.
    pub fn push(&mut self, event: Event) -> Option<Event> {
        let evicted = if self.events.len() >= self.capacity {
            self.events.pop_front()
        } else {
            None
        };
        self.events.push_back(event);
        evicted
    }

    /// Replace the whole log. Only the newest `capacity` events are kept.
    pub fn replace(&mut self, events: Vec<Event>) {
        let skip = events.len().saturating_sub(self.capacity);
        self.events = events.into_iter().skip(skip).collect();
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Event> {
        self.events.iter()
    }

    pub fn latest(&self) -> Option<&Event> {
        self.events.back()
    }

    /// Look up an event by backend id
    pub fn find_by_id(&self, id: u64) -> Option<&Event> {
        self.events.iter().rev().find(|e| e.id == Some(id))
    }

    pub fn to_vec(&self) -> Vec<Event> {
        self.events.iter().cloned().collect()
    }
}
