//! Ordered event buffer backing the coincidence queue
//!
//! Events are keyed by `(TriggerTime, arrival sequence)` so the tree order is
//! total and duplicates are kept. The coincidence window is never part of the
//! key; it is applied as a range scan from the front of the tree.

use super::error::InsertRejected;
use super::event::{TimestampedEvent, TriggerTime};
use std::collections::BTreeMap;

pub const DEFAULT_MAX_EVENTS: usize = 1_000_000;

#[derive(Debug, Clone)]
pub struct EventBuffer<E> {
    events: BTreeMap<(TriggerTime, u64), E>,
    next_seq: u64,
    capacity: usize,
}

impl<E: TimestampedEvent> EventBuffer<E> {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: BTreeMap::new(),
            next_seq: 0,
            capacity,
        }
    }

    /// Insert an event, refusing it once `capacity` events are buffered.
    pub fn try_insert(&mut self, event: E) -> Result<(), InsertRejected<E>> {
        if self.events.len() >= self.capacity {
            return Err(InsertRejected {
                event,
                len: self.events.len(),
                capacity: self.capacity,
            });
        }

        let key = (TriggerTime(event.trigger_time()), self.next_seq);
        self.next_seq = self.next_seq.wrapping_add(1);
        self.events.insert(key, event);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn earliest_time(&self) -> Option<f64> {
        self.events.keys().next().map(|(t, _)| t.value())
    }

    pub fn latest_time(&self) -> Option<f64> {
        self.events.keys().next_back().map(|(t, _)| t.value())
    }

    /// Time between the earliest and the latest buffered event (0 when empty)
    pub fn span(&self) -> f64 {
        match (self.earliest_time(), self.latest_time()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    pub fn pop_earliest(&mut self) -> Option<E> {
        self.events.pop_first().map(|(_, event)| event)
    }

    /// Events still buffered whose trigger time is less than `window` after
    /// `reference`. Only meaningful when `reference` is not later than the
    /// earliest buffered event, which is how `pop` calls it.
    pub fn within(&self, reference: f64, window: f64) -> impl Iterator<Item = &E> + '_ {
        self.events
            .iter()
            .take_while(move |((t, _), _)| t.value() - reference < window)
            .map(|(_, event)| event)
    }

    /// Drop everything, returning how many events were discarded
    pub fn clear(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.events.values()
    }
}
