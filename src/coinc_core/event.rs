//! Timestamped events as seen by the coincidence queue

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Category id of gamma-ray (head) front-end events
pub const HEAD_EVENT_ID: i32 = 1;

/// Category id of heavy-ion (tail) front-end events
pub const TAIL_EVENT_ID: i32 = 3;

/// Minimal capability set the queue needs from an event.
///
/// The queue orders events by `trigger_time` and treats two events as
/// coincident when their trigger times differ by less than the window.
/// Both values must use the same time unit.
pub trait TimestampedEvent {
    /// Trigger time of the event
    fn trigger_time(&self) -> f64;

    /// Numeric category used for singles statistics
    fn category_id(&self) -> i32;
}

/// Totally ordered trigger time used as the buffer key.
#[derive(Debug, Clone, Copy)]
pub struct TriggerTime(pub f64);

impl TriggerTime {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for TriggerTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TriggerTime {}

impl PartialOrd for TriggerTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TriggerTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Acquisition front-end that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "HEAD")]
    Head,
    #[serde(rename = "TAIL")]
    Tail,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Head => "head",
            Source::Tail => "tail",
        }
    }

    /// Default category id for events from this front-end
    pub fn event_id(&self) -> i32 {
        match self {
            Source::Head => HEAD_EVENT_ID,
            Source::Tail => TAIL_EVENT_ID,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger record emitted by one front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub source: Source,
    pub event_id: i32,
    pub serial: u64,
    /// Trigger time in microseconds on the front-end's clock
    pub trigger_time_us: f64,
}

impl TriggerEvent {
    pub fn new(source: Source, serial: u64, trigger_time_us: f64) -> Self {
        Self {
            source,
            event_id: source.event_id(),
            serial,
            trigger_time_us,
        }
    }
}

impl TimestampedEvent for TriggerEvent {
    fn trigger_time(&self) -> f64 {
        self.trigger_time_us
    }

    fn category_id(&self) -> i32 {
        self.event_id
    }
}
