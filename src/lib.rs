//! coincflow - time-windowed coincidence matching for independently clocked
//! event streams.
//!
//! - `coinc_core`: the synchronous coincidence queue, its diagnostics and the
//!   handler trait it reports through
//! - `pipeline`: async ingestion, a mutex-wrapped queue for several producers,
//!   and simulated front-ends
//! - `config`: environment-driven settings

pub mod coinc_core;
pub mod config;
pub mod pipeline;

pub use coinc_core::{
    CoincHandler, CoincRecord, CoincidenceQueue, CollectingHandler, Diagnostics, FlushReport,
    FlushTimeout, LoggingHandler, PushReport, QueueError, Retirement, Source, TallyHandler,
    TimestampedEvent, TriggerEvent,
};
pub use config::CoincConfig;
