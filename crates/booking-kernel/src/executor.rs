//! AttemptExecutor: the all-or-nothing booking protocol for one attempt.
//!
//! ```text
//! validate bounds ──✗──> Failure(OutOfRange)      no locks touched
//!   │
//! reject duplicates ─✗─> Failure(Duplicate)       no locks touched
//!   │
//! for seat in request order:
//!   try_acquire ──busy──> release all ─> Failure(Contended)
//!   into_vacant ─owned──> release all ─> Failure(AlreadyOwned)
//!   │
//! hold (random, locks kept)
//!   │
//! assign every seat ─> release all ─> Success
//! ```
//!
//! Locks are only try-locked, never waited on, so two customers contending
//! for overlapping bundles fail fast instead of deadlocking.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::config::HoldConfig;
use crate::error::AttemptError;
use crate::events::{BookingEvent, EventSink, Outcome};
use crate::grid::{SeatGrid, VacantSeat};
use crate::runner::Attempt;
use crate::seat::{CustomerId, SeatId};

/// Runs booking attempts against a shared grid and reports to a shared sink.
#[derive(Debug, Clone)]
pub struct AttemptExecutor {
    grid: Arc<SeatGrid>,
    sink: Arc<EventSink>,
    hold: HoldConfig,
}

impl AttemptExecutor {
    pub fn new(grid: Arc<SeatGrid>, sink: Arc<EventSink>, hold: HoldConfig) -> Self {
        Self { grid, sink, hold }
    }

    pub fn grid(&self) -> &Arc<SeatGrid> {
        &self.grid
    }

    pub fn sink(&self) -> &Arc<EventSink> {
        &self.sink
    }

    /// Run one attempt to completion and append its event.
    ///
    /// Never retries; on failure every lock taken by this attempt has been
    /// released before the event is appended.
    pub async fn execute<R>(&self, customer: CustomerId, attempt: &Attempt, rng: &mut R) -> Outcome
    where
        R: Rng + ?Sized,
    {
        let seats = attempt.seats();
        let outcome = match self.book(customer, seats, rng).await {
            Ok(()) => {
                info!(%customer, seats = seats.len(), "Booking succeeded");
                Outcome::Success
            }
            Err(reason) => {
                info!(
                    %customer,
                    reason = reason.kind(),
                    detail = %reason,
                    "Booking failed"
                );
                Outcome::Failure { reason }
            }
        };

        self.sink.append(BookingEvent {
            customer,
            seats: seats.to_vec(),
            outcome: outcome.clone(),
        });

        outcome
    }

    async fn book<R>(
        &self,
        customer: CustomerId,
        seats: &[SeatId],
        rng: &mut R,
    ) -> Result<(), AttemptError>
    where
        R: Rng + ?Sized,
    {
        self.check_request(seats)?;

        let mut vacant = self.acquire_all(customer, seats)?;

        let hold = self.hold_duration(rng);
        if !hold.is_zero() {
            debug!(%customer, hold_ms = hold.as_millis() as u64, "Holding seats");
            tokio::time::sleep(hold).await;
        }

        for seat in &mut vacant {
            seat.assign(customer);
        }

        for seat in vacant {
            seat.release();
        }

        Ok(())
    }

    /// Bounds and duplicate checks, before any lock is touched.
    fn check_request(&self, seats: &[SeatId]) -> Result<(), AttemptError> {
        for &seat in seats {
            self.grid.validate(seat)?;
        }

        let mut seen = HashSet::with_capacity(seats.len());
        for &seat in seats {
            if !seen.insert(seat) {
                return Err(AttemptError::Duplicate { seat });
            }
        }

        Ok(())
    }

    /// Try-lock every seat in request order, rolling back on the first miss.
    fn acquire_all(
        &self,
        customer: CustomerId,
        seats: &[SeatId],
    ) -> Result<Vec<VacantSeat<'_>>, AttemptError> {
        let mut vacant = Vec::with_capacity(seats.len());

        for &seat in seats {
            let lease = match self.grid.try_acquire(seat) {
                Ok(Some(lease)) => lease,
                Ok(None) => {
                    let reason = AttemptError::Contended { seat };
                    return Err(rollback(customer, vacant, reason));
                }
                Err(err) => return Err(rollback(customer, vacant, err.into())),
            };

            match lease.into_vacant() {
                Ok(free) => {
                    debug!(%customer, %seat, "Seat locked");
                    vacant.push(free);
                }
                Err((owned, owner)) => {
                    owned.release();
                    let reason = AttemptError::AlreadyOwned { seat, owner };
                    return Err(rollback(customer, vacant, reason));
                }
            }
        }

        Ok(vacant)
    }

    fn hold_duration<R>(&self, rng: &mut R) -> Duration
    where
        R: Rng + ?Sized,
    {
        let HoldConfig { min_ms, max_ms } = self.hold;
        let ms = if min_ms >= max_ms {
            max_ms
        } else {
            rng.random_range(min_ms..=max_ms)
        };
        Duration::from_millis(ms)
    }
}

fn rollback(customer: CustomerId, held: Vec<VacantSeat<'_>>, reason: AttemptError) -> AttemptError {
    debug!(
        %customer,
        released = held.len(),
        at = %reason.seat(),
        "Rolling back partial acquisition"
    );
    for seat in held {
        seat.release();
    }
    reason
}
