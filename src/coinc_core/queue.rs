//! Time-windowed coincidence queue
//!
//! Events from any number of front-ends are pushed in roughly time order. The
//! queue holds them until the span between its earliest and latest event
//! reaches the coincidence window, then retires the earliest one: every other
//! queued event less than one window later is reported as a coincident partner,
//! and the earliest event itself is reported as a single.
//!
//! ```text
//! push(event) → EventBuffer (ordered by trigger time)
//!     ↓ span ≥ window
//! pop() → handle_coinc(e0, other) for each partner
//!       → handle_single(e0)
//!     ↓
//! Diagnostics (optional, caller-owned)
//! ```
//!
//! Retirements come out in non-decreasing trigger-time order as long as no
//! event arrives a full window or more behind the latest pushed trigger time.
//! Such a straggler is still matched against what remains queued, but it
//! retires after events with later trigger times.

use super::buffer::{EventBuffer, DEFAULT_MAX_EVENTS};
use super::diagnostics::Diagnostics;
use super::error::QueueError;
use super::event::TimestampedEvent;
use super::handler::CoincHandler;
use crate::config::CoincConfig;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

/// Wall-clock budget for `flush`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTimeout {
    Unbounded,
    Within(Duration),
}

impl FlushTimeout {
    /// `secs <= 0` means drain completely
    pub fn from_secs(secs: i64) -> Self {
        if secs <= 0 {
            FlushTimeout::Unbounded
        } else {
            FlushTimeout::Within(Duration::from_secs(secs.unsigned_abs()))
        }
    }

    pub fn limit(&self) -> Option<Duration> {
        match self {
            FlushTimeout::Unbounded => None,
            FlushTimeout::Within(max) => Some(*max),
        }
    }
}

/// Outcome of a single retirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Retirement {
    /// Category of the retired event, `None` if the queue was empty
    pub singles_id: Option<i32>,
    pub found_coinc: bool,
}

impl Retirement {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PushReport {
    /// Trigger time of the new event minus the earliest queued trigger time
    pub time_diff: f64,
    pub retired: usize,
    pub found_coinc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    pub retired: usize,
    pub discarded: usize,
    pub timed_out: bool,
}

pub struct CoincidenceQueue<E, H> {
    buffer: EventBuffer<E>,
    window: f64,
    handler: H,
    _event: PhantomData<fn(E)>,
}

impl<E, H> CoincidenceQueue<E, H>
where
    E: TimestampedEvent,
    H: CoincHandler<E>,
{
    pub fn new(window: f64, handler: H) -> Result<Self, QueueError> {
        Self::with_capacity(window, DEFAULT_MAX_EVENTS, handler)
    }

    pub fn with_capacity(window: f64, max_events: usize, handler: H) -> Result<Self, QueueError> {
        if !window.is_finite() || window <= 0.0 {
            return Err(QueueError::InvalidWindow(window));
        }
        if max_events == 0 {
            return Err(QueueError::InvalidCapacity(max_events));
        }

        Ok(Self {
            buffer: EventBuffer::new(max_events),
            window,
            handler,
            _event: PhantomData,
        })
    }

    pub fn from_config(config: &CoincConfig, handler: H) -> Result<Self, QueueError> {
        Self::with_capacity(config.window_us, config.max_queue_events, handler)
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Time between the earliest and latest queued event
    pub fn span(&self) -> f64 {
        self.buffer.span()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Full once the queued span reaches the window
    pub fn is_full(&self) -> bool {
        !self.buffer.is_empty() && self.buffer.span() >= self.window
    }

    /// Queue an event, retiring the earliest events until the span is back
    /// under the window.
    ///
    /// If the buffer refuses the event, the whole queue is flushed and the
    /// insert retried once; coincidences between the flushed events and later
    /// arrivals are lost. A second refusal is returned as
    /// `QueueError::InsertExhausted` and should be treated as fatal.
    pub fn push(
        &mut self,
        event: E,
        mut diagnostics: Option<&mut Diagnostics>,
    ) -> Result<PushReport, QueueError> {
        let trigger_time = event.trigger_time();
        if !trigger_time.is_finite() {
            log::warn!(
                "Dropping event with non-finite trigger time {} (id = {})",
                trigger_time,
                event.category_id()
            );
            return Ok(PushReport::default());
        }

        self.insert_with_retry(event, diagnostics.as_deref_mut())?;

        let mut report = PushReport {
            time_diff: trigger_time - self.buffer.earliest_time().unwrap_or(trigger_time),
            ..PushReport::default()
        };

        while self.is_full() {
            let retirement = self.pop();
            report.retired += 1;
            report.found_coinc |= retirement.found_coinc;
            self.fill_diagnostics(diagnostics.as_deref_mut(), report.time_diff, retirement);
        }

        if report.retired == 0 {
            self.fill_diagnostics(diagnostics, report.time_diff, Retirement::none());
        }

        Ok(report)
    }

    /// Retire the earliest queued event.
    ///
    /// Every queued event less than one window after it is handed to
    /// `handle_coinc` as its partner, then the event itself goes to
    /// `handle_single`. Partners stay queued.
    pub fn pop(&mut self) -> Retirement {
        let Some(first) = self.buffer.pop_earliest() else {
            return Retirement::none();
        };

        let mut found_coinc = false;
        for other in self.buffer.within(first.trigger_time(), self.window) {
            found_coinc = true;
            self.handler.handle_coinc(&first, other);
        }

        let singles_id = first.category_id();
        self.handler.handle_single(first);

        Retirement {
            singles_id: Some(singles_id),
            found_coinc,
        }
    }

    /// Drain the queue through `pop`, giving up once `timeout` has elapsed.
    ///
    /// Events still queued at the deadline are dropped without reaching any
    /// handler, and `flush_timeout` is called once.
    pub fn flush(
        &mut self,
        timeout: FlushTimeout,
        mut diagnostics: Option<&mut Diagnostics>,
    ) -> FlushReport {
        let started = Instant::now();
        let mut report = FlushReport::default();

        while !self.buffer.is_empty() {
            if let Some(max_time) = timeout.limit() {
                if started.elapsed() >= max_time {
                    let skipped = self.buffer.clear();
                    self.handler.flush_timeout(max_time, skipped);
                    report.discarded = skipped;
                    report.timed_out = true;
                    break;
                }
            }

            let retirement = self.pop();
            report.retired += 1;
            self.fill_diagnostics(diagnostics.as_deref_mut(), 0.0, retirement);
        }

        report
    }

    fn insert_with_retry(
        &mut self,
        event: E,
        diagnostics: Option<&mut Diagnostics>,
    ) -> Result<(), QueueError> {
        let rejected = match self.buffer.try_insert(event) {
            Ok(()) => return Ok(()),
            Err(rejected) => rejected,
        };

        log::error!(
            "Failed to insert event: {}. Clearing the queue and trying again; \
             coincidences may be missed",
            rejected
        );
        self.flush(FlushTimeout::Unbounded, diagnostics);

        self.buffer.try_insert(rejected.into_event()).map_err(|again| {
            log::error!("Second insert failure: {}. Giving up", again);
            QueueError::InsertExhausted {
                capacity: again.capacity,
            }
        })
    }

    fn fill_diagnostics(
        &mut self,
        diagnostics: Option<&mut Diagnostics>,
        time_diff: f64,
        retirement: Retirement,
    ) {
        let Some(d) = diagnostics else {
            return;
        };
        d.record(
            self.buffer.len(),
            time_diff,
            retirement.found_coinc,
            retirement.singles_id,
        );
        self.handler.handle_diagnostics(d);
    }
}
