//! Booking Kernel: contended all-or-nothing seat acquisition.
//!
//! Customers race for seats in a fixed theater grid. Each seat carries its own
//! exclusive lock; a booking attempt try-locks every requested seat in order,
//! rolls back on the first contended or occupied seat, and otherwise holds the
//! whole bundle for a simulated deliberation before committing ownership.
//! Acquisition never waits on a lock, so customers cannot deadlock each other.

pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod grid;
pub mod kernel;
pub mod runner;
pub mod seat;

pub use config::{BookingConfig, GridConfig, HoldConfig};
pub use error::{AttemptError, ConfigError, GridError, KernelError};
pub use events::{BookingEvent, EventSink, Outcome};
pub use executor::AttemptExecutor;
pub use grid::{GridSnapshot, SeatGrid, SeatLease, VacantSeat};
pub use kernel::{BookingKernel, RunOutcome};
pub use runner::{Attempt, Customer, CustomerOutcome, CustomerRunner};
pub use seat::{CustomerId, SeatId};
