use crate::coinc_core::FlushTimeout;
use std::env;

/// Configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct CoincConfig {
    /// Coincidence window, same unit as event trigger times (µs)
    pub window_us: f64,

    /// Flush budget in seconds; zero or negative drains without a limit
    pub flush_timeout_secs: i64,

    /// Events the queue may hold before an insert is refused
    pub max_queue_events: usize,

    /// Channel buffer size between front-ends and ingestion
    pub channel_buffer: usize,

    /// Interval for ingestion throughput logging
    pub stats_interval_ms: u64,

    /// Triggers generated per simulated front-end
    pub sim_events: u64,

    pub sim_seed: u64,
}

impl Default for CoincConfig {
    fn default() -> Self {
        Self {
            window_us: 10.0,
            flush_timeout_secs: -1,
            max_queue_events: 1_000_000,
            channel_buffer: 10_000,
            stats_interval_ms: 10_000,
            sim_events: 100_000,
            sim_seed: 42,
        }
    }
}

impl CoincConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `COINC_WINDOW_US` (default: 10.0)
    /// - `COINC_FLUSH_TIMEOUT_SECS` (default: -1, unbounded)
    /// - `COINC_MAX_QUEUE_EVENTS` (default: 1000000)
    /// - `COINC_CHANNEL_BUFFER` (default: 10000)
    /// - `COINC_STATS_INTERVAL_MS` (default: 10000)
    /// - `COINC_SIM_EVENTS` (default: 100000)
    /// - `COINC_SIM_SEED` (default: 42)
    ///
    /// Unset or unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            window_us: parse_var("COINC_WINDOW_US").unwrap_or(defaults.window_us),
            flush_timeout_secs: parse_var("COINC_FLUSH_TIMEOUT_SECS")
                .unwrap_or(defaults.flush_timeout_secs),
            max_queue_events: parse_var("COINC_MAX_QUEUE_EVENTS")
                .unwrap_or(defaults.max_queue_events),
            channel_buffer: parse_var("COINC_CHANNEL_BUFFER").unwrap_or(defaults.channel_buffer),
            stats_interval_ms: parse_var("COINC_STATS_INTERVAL_MS")
                .unwrap_or(defaults.stats_interval_ms),
            sim_events: parse_var("COINC_SIM_EVENTS").unwrap_or(defaults.sim_events),
            sim_seed: parse_var("COINC_SIM_SEED").unwrap_or(defaults.sim_seed),
        }
    }

    pub fn flush_timeout(&self) -> FlushTimeout {
        FlushTimeout::from_secs(self.flush_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparsable {}={:?}, using default", name, raw);
            None
        }
    }
}
