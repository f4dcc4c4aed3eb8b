//! Coincidence simulation runtime
//!
//! Spawns a head and a tail front-end on separate clocks, merges their streams
//! in trigger-time order, feeds the result into one coincidence queue through
//! the ingestion task, and prints a JSON run summary.
//!
//! Usage:
//!   cargo run --release --bin coinc_sim
//!
//! Environment variables:
//!   COINC_WINDOW_US - Coincidence window in µs (default: 10)
//!   COINC_FLUSH_TIMEOUT_SECS - Final flush budget, <= 0 for none (default: -1)
//!   COINC_MAX_QUEUE_EVENTS - Queue capacity (default: 1000000)
//!   COINC_CHANNEL_BUFFER - Channel size (default: 10000)
//!   COINC_SIM_EVENTS - Physical triggers per run (default: 100000)
//!   COINC_SIM_SEED - Shared trigger schedule seed (default: 42)

use coincflow::coinc_core::{CoincidenceQueue, Diagnostics, Source, TallyHandler, TriggerEvent};
use coincflow::config::CoincConfig;
use coincflow::pipeline::{
    merge_by_trigger_time, run_mock_frontend, start_coinc_ingestion, FrontendConfig,
    IngestionSummary, SharedQueue,
};
use dotenv::dotenv;
use log::{error, info};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Serialize)]
struct RunSummary {
    window_us: f64,
    head_events: u64,
    tail_events: u64,
    ingestion: IngestionSummary,
    tally: TallyHandler,
    xtrig_mean_us: Option<f64>,
    diagnostics: Diagnostics,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = CoincConfig::from_env();

    info!("Coincidence simulation");
    info!("   ├─ Window: {} µs", config.window_us);
    info!("   ├─ Flush timeout: {:?}", config.flush_timeout());
    info!("   ├─ Queue capacity: {} events", config.max_queue_events);
    info!("   ├─ Channel buffer: {} events", config.channel_buffer);
    info!("   └─ Triggers: {} (seed {})", config.sim_events, config.sim_seed);

    let queue = CoincidenceQueue::<TriggerEvent, _>::from_config(&config, TallyHandler::new())?;
    let shared = SharedQueue::new(queue);

    let buffer = config.channel_buffer.max(1);
    let (head_tx, head_rx) = mpsc::channel::<TriggerEvent>(buffer);
    let (tail_tx, tail_rx) = mpsc::channel::<TriggerEvent>(buffer);
    let (tx, rx) = mpsc::channel::<TriggerEvent>(buffer);

    let mut head = FrontendConfig::new(Source::Head, config.sim_events, config.sim_seed);
    head.efficiency = 0.7;
    head.readout_pause = Some(Duration::from_millis(1));

    let mut tail = FrontendConfig::new(Source::Tail, config.sim_events, config.sim_seed);
    tail.efficiency = 0.4;
    tail.clock_offset_us = 3.0;
    tail.jitter_us = 2.0;
    tail.readout_pause = Some(Duration::from_millis(1));

    let head_handle = tokio::spawn(run_mock_frontend(head, head_tx));
    let tail_handle = tokio::spawn(run_mock_frontend(tail, tail_tx));
    let merge_handle = tokio::spawn(merge_by_trigger_time(vec![head_rx, tail_rx], tx));

    let ingestion = tokio::spawn(start_coinc_ingestion(
        rx,
        shared.clone(),
        config.stats_interval_ms,
        config.flush_timeout(),
    ));

    let head_events = head_handle.await?;
    let tail_events = tail_handle.await?;
    let merged = merge_handle.await?;
    info!(
        "Front-ends done: {} head, {} tail events, {} merged",
        head_events, tail_events, merged
    );

    let ingestion = match ingestion.await? {
        Ok(summary) => summary,
        Err(e) => {
            error!("Ingestion aborted: {}", e);
            return Err(e.into());
        }
    };

    let tally = shared.with_handler(|h| h.clone());
    let summary = RunSummary {
        window_us: config.window_us,
        head_events,
        tail_events,
        ingestion,
        xtrig_mean_us: tally.xtrig_mean(),
        tally,
        diagnostics: shared.diagnostics(),
    };

    info!(
        "Run complete: {} singles, {} coincidences",
        summary.tally.singles, summary.tally.coincidences
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
