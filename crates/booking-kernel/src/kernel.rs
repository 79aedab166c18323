//! The booking kernel: one concurrent runner per customer over a shared grid.
//!
//! ## Usage
//!
//! ```ignore
//! use booking_kernel::{BookingConfig, BookingKernel};
//!
//! let kernel = BookingKernel::new(BookingConfig::default())?;
//! let mut live = kernel.sink().subscribe();
//! tokio::spawn(async move {
//!     while let Some(event) = live.recv().await {
//!         println!("{event}");
//!     }
//! });
//!
//! let outcome = kernel.run(customers).await?;
//! println!("{} seats booked", outcome.snapshot.booked_count());
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::info;

use crate::config::BookingConfig;
use crate::error::{ConfigError, KernelError};
use crate::events::{BookingEvent, EventSink};
use crate::executor::AttemptExecutor;
use crate::grid::{GridSnapshot, SeatGrid};
use crate::runner::{Customer, CustomerOutcome, CustomerRunner};

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final owner of every seat
    pub snapshot: GridSnapshot,
    /// Event log in append order
    pub events: Vec<BookingEvent>,
    /// Per-customer outcomes, in the order customers were supplied
    pub customers: Vec<CustomerOutcome>,
    /// Wall time from first spawn to last join
    pub elapsed: Duration,
}

/// Owns the process-wide grid and event sink for a booking run.
///
/// The grid keeps its state across [`BookingKernel::run`] calls: seats
/// booked by one run stay booked for the next.
pub struct BookingKernel {
    config: BookingConfig,
    grid: Arc<SeatGrid>,
    sink: Arc<EventSink>,
}

impl BookingKernel {
    pub fn new(config: BookingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = SeatGrid::new(&config.grid)?;
        Ok(Self {
            config,
            grid: Arc::new(grid),
            sink: Arc::new(EventSink::new()),
        })
    }

    pub fn grid(&self) -> &Arc<SeatGrid> {
        &self.grid
    }

    pub fn sink(&self) -> &Arc<EventSink> {
        &self.sink
    }

    /// An executor sharing this kernel's grid and sink.
    pub fn executor(&self) -> AttemptExecutor {
        AttemptExecutor::new(self.grid.clone(), self.sink.clone(), self.config.hold)
    }

    /// Start every customer at once and wait for all of them to finish.
    pub async fn run(&self, customers: Vec<Customer>) -> Result<RunOutcome, KernelError> {
        let started = Instant::now();
        let customer_count = customers.len();
        let attempt_count: usize = customers.iter().map(|c| c.attempts().len()).sum();

        info!(
            customers = customer_count,
            attempts = attempt_count,
            aisles = self.grid.aisles(),
            seats_per_aisle = self.grid.seats_per_aisle(),
            hold_min_ms = self.config.hold.min_ms,
            hold_max_ms = self.config.hold.max_ms,
            "Starting booking run"
        );

        let handles: Vec<_> = customers
            .into_iter()
            .map(|customer| {
                let runner = CustomerRunner::new(customer, self.executor(), self.config.seed);
                tokio::spawn(runner.run())
            })
            .collect();

        let mut outcomes = Vec::with_capacity(customer_count);
        for joined in join_all(handles).await {
            outcomes.push(joined?);
        }

        let snapshot = self.grid.snapshot().await;
        let events = self.sink.events();
        let elapsed = started.elapsed();

        info!(
            events = events.len(),
            succeeded = events.iter().filter(|e| e.is_success()).count(),
            seats_booked = snapshot.booked_count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Booking run complete"
        );

        Ok(RunOutcome {
            snapshot,
            events,
            customers: outcomes,
            elapsed,
        })
    }
}
