//! Coincidence Core - time-windowed matching of events from separate front-ends
//!
//! Two acquisition front-ends run on their own clocks and emit independently
//! timestamped events. This module correlates them after the fact: any two
//! events whose trigger times differ by less than the coincidence window are
//! reported as a coincident pair.
//!
//! # Architecture
//!
//! ```text
//! TimestampedEvent → CoincidenceQueue::push()
//!     ↓
//! EventBuffer (BTreeMap keyed by trigger time)
//!     ↓ span ≥ window, or flush()
//! CoincidenceQueue::pop()
//!     ↓
//! CoincHandler (handle_coinc / handle_single / handle_diagnostics)
//! ```

pub mod buffer;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod handler;
pub mod queue;

pub use buffer::{EventBuffer, DEFAULT_MAX_EVENTS};
pub use diagnostics::{Diagnostics, MAX_TYPES};
pub use error::{InsertRejected, QueueError};
pub use event::{Source, TimestampedEvent, TriggerEvent, TriggerTime, HEAD_EVENT_ID, TAIL_EVENT_ID};
pub use handler::{CoincHandler, CoincRecord, CollectingHandler, LoggingHandler, TallyHandler};
pub use queue::{CoincidenceQueue, FlushReport, FlushTimeout, PushReport, Retirement};
