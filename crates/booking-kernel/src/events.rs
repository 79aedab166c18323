//! Booking events and the sink that serializes them.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::AttemptError;
use crate::seat::{CustomerId, SeatId, format_seats};

/// Result of one booking attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure { reason: AttemptError },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn reason(&self) -> Option<&AttemptError> {
        match self {
            Self::Success => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}

/// One finished attempt, as appended to the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEvent {
    pub customer: CustomerId,
    /// The attempt's requested seats, in request order
    pub seats: Vec<SeatId>,
    pub outcome: Outcome,
}

impl BookingEvent {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// `Customer 3 - Success - Aisle 1, Seat 1, Aisle 1, Seat 2`
impl fmt::Display for BookingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_success() { "Success" } else { "Fail" };
        write!(
            f,
            "Customer {} - {} - {}",
            self.customer,
            status,
            format_seats(&self.seats)
        )
    }
}

#[derive(Debug, Default)]
struct SinkState {
    log: Vec<BookingEvent>,
    subscriber: Option<mpsc::UnboundedSender<BookingEvent>>,
}

/// Ordered, append-only event log shared by every customer runner.
///
/// Appends are mutually exclusive, so an event is never interleaved with
/// another. Across customers the order is whichever append wins the lock.
/// An optional subscriber receives each event in log order as it lands.
#[derive(Debug, Default)]
pub struct EventSink {
    state: Mutex<SinkState>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream events as they are appended. Replaces any earlier subscriber.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<BookingEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscriber = Some(tx);
        rx
    }

    /// Drop the subscriber so its receiver drains and ends.
    pub fn unsubscribe(&self) {
        self.lock().subscriber = None;
    }

    pub fn append(&self, event: BookingEvent) {
        let mut state = self.lock();
        if let Some(tx) = &state.subscriber {
            // Ignore send errors - receiver may have been dropped
            let _ = tx.send(event.clone());
        }
        state.log.push(event);
    }

    /// Copy of the log so far.
    pub fn events(&self) -> Vec<BookingEvent> {
        self.lock().log.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().log.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkState> {
        // A panicked appender cannot leave a half-written event behind.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
