//! Time-ordered merge of several front-end channels
//!
//! Each front-end delivers its own events in trigger-time order, but the
//! tasks run at their own pace, so one source can be whole readouts ahead of
//! the other. The merge holds the next event of every open source and only
//! forwards the earliest one, which means nothing is released until every
//! source has either produced its next event or closed. The forwarded stream
//! is in trigger-time order as long as each input is.
//!
//! ```text
//! head rx ─┐
//!          ├─ merge_by_trigger_time ─→ tx (ingestion)
//! tail rx ─┘
//! ```

use crate::coinc_core::TimestampedEvent;
use tokio::sync::mpsc;

struct Input<E> {
    rx: mpsc::Receiver<E>,
    pending: Option<E>,
    open: bool,
}

/// Forward events from `inputs` to `tx` in trigger-time order.
///
/// Ties go to the input listed first. Returns the number of events forwarded;
/// stops early if `tx` is closed.
pub async fn merge_by_trigger_time<E>(inputs: Vec<mpsc::Receiver<E>>, tx: mpsc::Sender<E>) -> u64
where
    E: TimestampedEvent,
{
    let mut inputs: Vec<Input<E>> = inputs
        .into_iter()
        .map(|rx| Input {
            rx,
            pending: None,
            open: true,
        })
        .collect();
    let mut forwarded = 0u64;

    loop {
        for input in inputs.iter_mut() {
            if input.pending.is_none() && input.open {
                input.pending = input.rx.recv().await;
                input.open = input.pending.is_some();
            }
        }

        let mut earliest: Option<usize> = None;
        for (idx, input) in inputs.iter().enumerate() {
            let Some(event) = &input.pending else {
                continue;
            };
            let earlier = match earliest.and_then(|e| inputs[e].pending.as_ref()) {
                Some(best) => event.trigger_time().total_cmp(&best.trigger_time()).is_lt(),
                None => true,
            };
            if earlier {
                earliest = Some(idx);
            }
        }

        let Some(event) = earliest.and_then(|idx| inputs[idx].pending.take()) else {
            break;
        };
        if tx.send(event).await.is_err() {
            log::warn!("Merge output closed after {} events", forwarded);
            return forwarded;
        }
        forwarded += 1;
    }

    log::info!("All front-ends closed, {} events merged", forwarded);
    forwarded
}
