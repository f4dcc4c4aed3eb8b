//! Pipeline - front-ends, channel ingestion and the shared queue
//!
//! ```text
//! run_mock_frontend (head) ─→ mpsc ─┐
//!                                   ├─ merge_by_trigger_time ─→ mpsc ─→ start_coinc_ingestion
//! run_mock_frontend (tail) ─→ mpsc ─┘                                         ↓
//!                                                                  SharedQueue (Mutex)
//!                                                                         ↓
//!                                                              CoincidenceQueue + handler
//! ```

pub mod frontend;
pub mod ingestion;
pub mod merge;
pub mod shared;

pub use frontend::{generate_events, run_mock_frontend, FrontendConfig};
pub use ingestion::{start_coinc_ingestion, IngestionSummary};
pub use merge::merge_by_trigger_time;
pub use shared::SharedQueue;
