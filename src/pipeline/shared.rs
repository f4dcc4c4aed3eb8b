//! Mutex-guarded queue for several producers
//!
//! The queue itself has no locking. Producers on different tasks or threads
//! share one `SharedQueue`, which serialises `push`/`flush` together with the
//! handler calls they trigger.

use crate::coinc_core::{
    CoincHandler, CoincidenceQueue, Diagnostics, FlushReport, FlushTimeout, PushReport,
    QueueError, TimestampedEvent,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct SharedState<E, H> {
    queue: CoincidenceQueue<E, H>,
    diagnostics: Diagnostics,
}

pub struct SharedQueue<E, H> {
    inner: Arc<Mutex<SharedState<E, H>>>,
}

impl<E, H> Clone for SharedQueue<E, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, H> SharedQueue<E, H>
where
    E: TimestampedEvent,
    H: CoincHandler<E>,
{
    pub fn new(queue: CoincidenceQueue<E, H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SharedState {
                queue,
                diagnostics: Diagnostics::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState<E, H>> {
        // A handler that panicked mid-retirement leaves the queue consistent:
        // the retiring event was already removed from the buffer.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, event: E) -> Result<PushReport, QueueError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.queue.push(event, Some(&mut state.diagnostics))
    }

    pub fn flush(&self, timeout: FlushTimeout) -> FlushReport {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.queue.flush(timeout, Some(&mut state.diagnostics))
    }

    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Copy of the current diagnostics counters
    pub fn diagnostics(&self) -> Diagnostics {
        self.lock().diagnostics.clone()
    }

    pub fn reset_diagnostics(&self) {
        self.lock().diagnostics.reset();
    }

    /// Run `f` against the handler while holding the lock
    pub fn with_handler<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(self.lock().queue.handler_mut())
    }
}
