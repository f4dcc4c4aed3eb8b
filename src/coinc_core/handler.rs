//! Retirement callbacks
//!
//! The queue owns one `CoincHandler` and calls it for every retired event and
//! every coincident pair. Handlers run while the queue is mid-retirement, so
//! they only ever see events, never the queue itself.

use super::diagnostics::{Diagnostics, MAX_TYPES};
use super::event::TimestampedEvent;
use serde::Serialize;
use std::fmt::Debug;
use std::time::Duration;

pub trait CoincHandler<E> {
    /// Called once for every retired event, matched or not
    fn handle_single(&mut self, event: E);

    /// Called once per partner of the retiring event; `first` is the earliest
    fn handle_coinc(&mut self, first: &E, other: &E);

    /// Called after each diagnostics update when a sink was supplied
    fn handle_diagnostics(&mut self, diagnostics: &Diagnostics) {
        log::debug!(
            "Diagnostics: size = {}, n_coinc = {}, time_diff = {}, n_singles = {:?}",
            diagnostics.size,
            diagnostics.n_coinc,
            diagnostics.time_diff,
            &diagnostics.n_singles[..MAX_TYPES]
        );
    }

    /// Called once when a bounded flush runs out of time
    fn flush_timeout(&mut self, max_time: Duration, skipped: usize) {
        log::info!(
            "Maximum flush timeout of {:.3}s reached. Clearing event queue (skipping {} events)",
            max_time.as_secs_f64(),
            skipped
        );
    }
}

/// Logs every single and coincidence
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl<E: TimestampedEvent + Debug> CoincHandler<E> for LoggingHandler {
    fn handle_single(&mut self, event: E) {
        log::info!(
            "Singles event: id = {}, trigger = {} ({:?})",
            event.category_id(),
            event.trigger_time(),
            event
        );
    }

    fn handle_coinc(&mut self, first: &E, other: &E) {
        log::info!(
            "Coincidence: ids = ({}, {}), xtrig = {}",
            first.category_id(),
            other.category_id(),
            other.trigger_time() - first.trigger_time()
        );
    }
}

/// One matched pair, with `xtrig = t(other) - t(first)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoincRecord<E> {
    pub first: E,
    pub other: E,
    pub xtrig: f64,
}

/// Keeps copies of everything it is handed
#[derive(Debug, Clone)]
pub struct CollectingHandler<E> {
    pub singles: Vec<E>,
    pub coincidences: Vec<CoincRecord<E>>,
    pub timeouts: Vec<(Duration, usize)>,
    pub diagnostics_updates: usize,
}

impl<E> Default for CollectingHandler<E> {
    fn default() -> Self {
        Self {
            singles: Vec::new(),
            coincidences: Vec::new(),
            timeouts: Vec::new(),
            diagnostics_updates: 0,
        }
    }
}

impl<E> CollectingHandler<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: TimestampedEvent + Clone> CoincHandler<E> for CollectingHandler<E> {
    fn handle_single(&mut self, event: E) {
        self.singles.push(event);
    }

    fn handle_coinc(&mut self, first: &E, other: &E) {
        self.coincidences.push(CoincRecord {
            first: first.clone(),
            other: other.clone(),
            xtrig: other.trigger_time() - first.trigger_time(),
        });
    }

    fn handle_diagnostics(&mut self, _diagnostics: &Diagnostics) {
        self.diagnostics_updates += 1;
    }

    fn flush_timeout(&mut self, max_time: Duration, skipped: usize) {
        self.timeouts.push((max_time, skipped));
    }
}

/// Running counts for long runs where keeping every event is not an option
#[derive(Debug, Clone, Default, Serialize)]
pub struct TallyHandler {
    pub singles: u64,
    pub coincidences: u64,
    pub discarded: u64,
    pub xtrig_min: Option<f64>,
    pub xtrig_max: Option<f64>,
    xtrig_sum: f64,
}

impl TallyHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn xtrig_mean(&self) -> Option<f64> {
        if self.coincidences == 0 {
            return None;
        }
        Some(self.xtrig_sum / self.coincidences as f64)
    }
}

impl<E: TimestampedEvent> CoincHandler<E> for TallyHandler {
    fn handle_single(&mut self, _event: E) {
        self.singles += 1;
    }

    fn handle_coinc(&mut self, first: &E, other: &E) {
        let xtrig = other.trigger_time() - first.trigger_time();
        self.coincidences += 1;
        self.xtrig_sum += xtrig;
        self.xtrig_min = Some(self.xtrig_min.map_or(xtrig, |m| m.min(xtrig)));
        self.xtrig_max = Some(self.xtrig_max.map_or(xtrig, |m| m.max(xtrig)));
    }

    fn flush_timeout(&mut self, max_time: Duration, skipped: usize) {
        self.discarded += skipped as u64;
        log::info!(
            "Flush timed out after {:.3}s, {} events discarded",
            max_time.as_secs_f64(),
            skipped
        );
    }
}
