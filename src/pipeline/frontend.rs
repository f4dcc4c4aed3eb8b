//! Simulated acquisition front-end
//!
//! Both front-ends sample one shared schedule of physical triggers (same seed),
//! each with its own detection efficiency, clock offset and timing jitter. A
//! trigger seen by both becomes a coincidence candidate; one seen by a single
//! front-end stays a single.

use crate::coinc_core::{Source, TriggerEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub source: Source,
    /// Physical triggers in the shared schedule
    pub trigger_count: u64,
    /// Seed of the shared schedule; must match across front-ends
    pub schedule_seed: u64,
    /// Mean spacing between physical triggers (µs)
    pub mean_spacing_us: f64,
    /// Probability that this front-end records a given trigger
    pub efficiency: f64,
    /// Constant offset of this front-end's clock (µs)
    pub clock_offset_us: f64,
    /// Half-width of the uniform timing jitter (µs)
    pub jitter_us: f64,
    /// Trigger-time span covered by one readout (µs)
    pub readout_window_us: f64,
    /// Pause after each readout; `None` sends as fast as the channel allows
    pub readout_pause: Option<Duration>,
}

impl FrontendConfig {
    pub fn new(source: Source, trigger_count: u64, schedule_seed: u64) -> Self {
        Self {
            source,
            trigger_count,
            schedule_seed,
            mean_spacing_us: 50.0,
            efficiency: 0.6,
            clock_offset_us: 0.0,
            jitter_us: 1.0,
            readout_window_us: 1_000.0,
            readout_pause: None,
        }
    }
}

/// Generate this front-end's events in trigger-time order.
pub fn generate_events(config: &FrontendConfig) -> Vec<TriggerEvent> {
    let mut schedule = StdRng::seed_from_u64(config.schedule_seed);
    // Per-source stream so head and tail miss different triggers
    let source_salt = (config.source.event_id() as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut local = StdRng::seed_from_u64(config.schedule_seed ^ source_salt);

    let efficiency = config.efficiency.clamp(0.0, 1.0);
    let mut events = Vec::new();
    let mut physical_time = 0.0;

    for _ in 0..config.trigger_count {
        physical_time += schedule.gen_range(0.0..2.0 * config.mean_spacing_us.max(f64::EPSILON));
        let recorded = local.gen_bool(efficiency);
        let jitter = if config.jitter_us > 0.0 {
            local.gen_range(-config.jitter_us..config.jitter_us)
        } else {
            0.0
        };
        if !recorded {
            continue;
        }

        let t = physical_time + config.clock_offset_us + jitter;
        events.push(TriggerEvent::new(config.source, 0, t));
    }

    // Jitter can swap neighbours; serials follow readout order
    events.sort_by(|a, b| a.trigger_time_us.total_cmp(&b.trigger_time_us));
    for (serial, event) in events.iter_mut().enumerate() {
        event.serial = serial as u64;
    }
    events
}

/// Send this front-end's events down `tx`, returning how many were delivered.
///
/// Events go out one readout at a time, each covering `readout_window_us` of
/// trigger time, so front-ends with the same pause stay roughly in step.
/// Stops early if the receiver is dropped.
pub async fn run_mock_frontend(config: FrontendConfig, tx: mpsc::Sender<TriggerEvent>) -> u64 {
    let events = generate_events(&config);
    log::info!(
        "Front-end {} starting: {} events from {} triggers",
        config.source,
        events.len(),
        config.trigger_count
    );

    let readout_window = config.readout_window_us.max(f64::EPSILON);
    let mut sent = 0u64;
    let mut readout_end = readout_window;
    for event in events {
        while event.trigger_time_us >= readout_end {
            readout_end += readout_window;
            match config.readout_pause {
                Some(pause) => tokio::time::sleep(pause).await,
                None => tokio::task::yield_now().await,
            }
        }

        if tx.send(event).await.is_err() {
            log::warn!("Front-end {}: channel closed after {} events", config.source, sent);
            return sent;
        }
        sent += 1;
    }

    log::info!("Front-end {} finished: {} events sent", config.source, sent);
    sent
}
