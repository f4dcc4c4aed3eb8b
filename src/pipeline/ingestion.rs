//! Pipeline ingestion - async channel processor for front-end events
//!
//! Front-ends send events into one mpsc channel; this task pushes them into a
//! `SharedQueue` one at a time and performs the final flush when every sender
//! has gone away.

use super::shared::SharedQueue;
use crate::coinc_core::{CoincHandler, FlushReport, FlushTimeout, QueueError, TimestampedEvent};
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestionSummary {
    pub events_received: u64,
    /// Retirements triggered by pushes (excludes the final flush)
    pub retired_on_push: u64,
    pub final_flush_retired: usize,
    pub final_flush_discarded: usize,
    pub final_flush_timed_out: bool,
}

impl IngestionSummary {
    fn record_flush(&mut self, report: FlushReport) {
        self.final_flush_retired = report.retired;
        self.final_flush_discarded = report.discarded;
        self.final_flush_timed_out = report.timed_out;
    }
}

/// Run ingestion until the channel closes.
///
/// Arguments:
/// - `rx`: Receiver end of the front-end event channel
/// - `queue`: Shared coincidence queue
/// - `stats_interval_ms`: How often to log throughput and queue state
/// - `flush_timeout`: Budget for the final flush
///
/// Returns the fatal `QueueError` if an insert fails after the drain-and-retry.
pub async fn start_coinc_ingestion<E, H>(
    mut rx: mpsc::Receiver<E>,
    queue: SharedQueue<E, H>,
    stats_interval_ms: u64,
    flush_timeout: FlushTimeout,
) -> Result<IngestionSummary, QueueError>
where
    E: TimestampedEvent,
    H: CoincHandler<E>,
{
    log::info!("Starting coincidence ingestion");
    log::info!("   ├─ Stats interval: {}ms", stats_interval_ms);
    log::info!("   └─ Final flush: {:?}", flush_timeout);

    let mut stats_timer = interval(Duration::from_millis(stats_interval_ms.max(1)));
    let mut summary = IngestionSummary::default();
    let mut events_since_log = 0u64;
    let mut last_log_time = Instant::now();

    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(event) = received else {
                    break;
                };

                match queue.push(event) {
                    Ok(report) => {
                        summary.events_received += 1;
                        summary.retired_on_push += report.retired as u64;
                        events_since_log += 1;
                    }
                    Err(e) => {
                        log::error!("Fatal queue error after {} events: {}", summary.events_received, e);
                        return Err(e);
                    }
                }
            }

            _ = stats_timer.tick() => {
                let elapsed = last_log_time.elapsed().as_secs_f64();
                if elapsed > 0.0 && events_since_log > 0 {
                    let diagnostics = queue.diagnostics();
                    log::info!(
                        "Ingestion rate: {:.1} events/sec | queue: {} | coincidences: {} | channel: {}",
                        events_since_log as f64 / elapsed,
                        diagnostics.size,
                        diagnostics.n_coinc,
                        rx.len()
                    );
                }
                events_since_log = 0;
                last_log_time = Instant::now();
            }
        }
    }

    log::info!(
        "Event channel closed after {} events, flushing {} queued",
        summary.events_received,
        queue.len()
    );
    let report = queue.flush(flush_timeout);
    if report.timed_out {
        log::warn!("Final flush timed out, {} events discarded", report.discarded);
    }
    summary.record_flush(report);

    log::info!("Coincidence ingestion stopped");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coinc_core::{CoincidenceQueue, CollectingHandler, Source, TriggerEvent};

    #[tokio::test]
    async fn test_ingestion_processes_and_flushes() {
        let (tx, rx) = mpsc::channel(32);
        let queue: SharedQueue<TriggerEvent, CollectingHandler<TriggerEvent>> =
            SharedQueue::new(CoincidenceQueue::new(3.0, CollectingHandler::new()).unwrap());

        let ingestion = tokio::spawn(start_coinc_ingestion(
            rx,
            queue.clone(),
            1_000,
            FlushTimeout::Unbounded,
        ));

        for (source, t) in [
            (Source::Head, 0.0),
            (Source::Tail, 1.0),
            (Source::Head, 20.0),
            (Source::Tail, 21.5),
        ] {
            tx.send(TriggerEvent::new(source, 0, t)).await.unwrap();
        }
        drop(tx);

        let summary = ingestion.await.unwrap().unwrap();
        assert_eq!(summary.events_received, 4);
        assert_eq!(summary.retired_on_push as usize + summary.final_flush_retired, 4);
        assert!(!summary.final_flush_timed_out);
        assert!(queue.is_empty());

        let xtrigs: Vec<f64> = queue.with_handler(|h| {
            h.coincidences.iter().map(|c| c.xtrig).collect()
        });
        assert_eq!(xtrigs, vec![1.0, 1.5]);
    }

    #[tokio::test]
    async fn test_ingestion_recovers_from_full_queue() {
        let (tx, rx) = mpsc::channel(4);
        let queue: SharedQueue<TriggerEvent, CollectingHandler<TriggerEvent>> =
            SharedQueue::new(CoincidenceQueue::with_capacity(5.0, 1, CollectingHandler::new()).unwrap());

        tx.send(TriggerEvent::new(Source::Head, 0, 0.0)).await.unwrap();
        tx.send(TriggerEvent::new(Source::Tail, 0, 1.0)).await.unwrap();
        drop(tx);

        // Capacity 1 still recovers: the drain frees the only slot
        let summary = start_coinc_ingestion(rx, queue.clone(), 1_000, FlushTimeout::Unbounded)
            .await
            .unwrap();
        assert_eq!(summary.events_received, 2);
        assert_eq!(queue.with_handler(|h| h.singles.len()), 2);
        assert_eq!(queue.with_handler(|h| h.coincidences.len()), 0);
    }
}
