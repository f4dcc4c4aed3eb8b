//! Queue diagnostics counters

use serde::Serialize;

/// Number of singles categories tracked by `Diagnostics::n_singles`
pub const MAX_TYPES: usize = 10;

/// Counters refreshed by the queue after every retirement.
///
/// Owned by the caller and lent to `push`/`flush`; the queue never keeps it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Queue occupancy after the last update
    pub size: usize,
    /// Retirements that found at least one coincidence
    pub n_coinc: u64,
    /// Gap between the last arrival and the earliest queued event
    pub time_diff: f64,
    /// Singles retired per category id
    pub n_singles: [u64; MAX_TYPES],
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            size: 0,
            n_coinc: 0,
            time_diff: 0.0,
            n_singles: [0; MAX_TYPES],
        }
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every field
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record one queue update. `singles_id` is `None` when nothing was retired.
    pub fn record(
        &mut self,
        size: usize,
        time_diff: f64,
        found_coinc: bool,
        singles_id: Option<i32>,
    ) {
        self.size = size;
        self.time_diff = time_diff;
        if found_coinc {
            self.n_coinc += 1;
        }

        let Some(id) = singles_id else {
            return;
        };
        match usize::try_from(id) {
            Ok(idx) if idx < MAX_TYPES => self.n_singles[idx] += 1,
            _ => {
                log::warn!(
                    "Singles id out of range for diagnostics: id = {}, types = {}",
                    id,
                    MAX_TYPES
                );
            }
        }
    }

    pub fn total_singles(&self) -> u64 {
        self.n_singles.iter().sum()
    }
}
