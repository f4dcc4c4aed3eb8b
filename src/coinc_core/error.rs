//! Error types for the coincidence queue

/// Errors surfaced by queue construction and by `push`.
///
/// `InsertExhausted` is the only runtime error; everything else the queue
/// runs into is logged and handled in place.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueError {
    InvalidWindow(f64),
    InvalidCapacity(usize),
    InsertExhausted { capacity: usize },
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::InvalidWindow(w) => {
                write!(f, "Coincidence window must be finite and > 0, got {}", w)
            }
            QueueError::InvalidCapacity(c) => {
                write!(f, "Queue capacity must be > 0, got {}", c)
            }
            QueueError::InsertExhausted { capacity } => write!(
                f,
                "Event insertion failed twice (capacity {}), giving up",
                capacity
            ),
        }
    }
}

impl std::error::Error for QueueError {}

/// Insert refused by a full buffer; hands the event back to the caller.
#[derive(Debug)]
pub struct InsertRejected<E> {
    pub event: E,
    pub len: usize,
    pub capacity: usize,
}

impl<E> InsertRejected<E> {
    pub fn into_event(self) -> E {
        self.event
    }
}

impl<E> std::fmt::Display for InsertRejected<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Event buffer full (size = {}, max size = {})",
            self.len, self.capacity
        )
    }
}

impl<E: std::fmt::Debug> std::error::Error for InsertRejected<E> {}
