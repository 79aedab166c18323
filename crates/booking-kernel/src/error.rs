//! Error types for the kernel.
//!
//! [`AttemptError`] is the failure taxonomy of a single booking attempt. It
//! never escapes the executor as an error: it is recorded as the reason of a
//! failure event and the customer moves on to its next attempt.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::seat::{CustomerId, SeatId};

/// Why a booking attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptError {
    /// A requested seat lies outside the grid. No lock was touched.
    #[error("{seat} is outside the {aisles}x{seats_per_aisle} theater")]
    OutOfRange {
        seat: SeatId,
        aisles: usize,
        seats_per_aisle: usize,
    },

    /// A requested seat was locked by another attempt in flight.
    #[error("{seat} is held by another booking")]
    Contended { seat: SeatId },

    /// A requested seat was lockable but already booked.
    #[error("{seat} is already booked by customer {owner}")]
    AlreadyOwned { seat: SeatId, owner: CustomerId },

    /// The attempt lists the same seat more than once. No lock was touched.
    #[error("{seat} is requested more than once")]
    Duplicate { seat: SeatId },
}

impl AttemptError {
    /// Stable short name used for tallies and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "out_of_range",
            Self::Contended { .. } => "contended",
            Self::AlreadyOwned { .. } => "already_owned",
            Self::Duplicate { .. } => "duplicate",
        }
    }

    /// The seat that caused the failure.
    pub fn seat(&self) -> SeatId {
        match self {
            Self::OutOfRange { seat, .. }
            | Self::Contended { seat }
            | Self::AlreadyOwned { seat, .. }
            | Self::Duplicate { seat } => *seat,
        }
    }
}

/// Misuse of the seat grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("{seat} is outside the {aisles}x{seats_per_aisle} theater")]
    OutOfRange {
        seat: SeatId,
        aisles: usize,
        seats_per_aisle: usize,
    },

    /// Seats are assigned once for the lifetime of a run.
    #[error("{seat} is already booked by customer {owner}")]
    AlreadyOwned { seat: SeatId, owner: CustomerId },
}

impl From<GridError> for AttemptError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::OutOfRange {
                seat,
                aisles,
                seats_per_aisle,
            } => Self::OutOfRange {
                seat,
                aisles,
                seats_per_aisle,
            },
            GridError::AlreadyOwned { seat, owner } => Self::AlreadyOwned { seat, owner },
        }
    }
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("theater must have at least one seat (got {aisles} aisles x {seats_per_aisle} seats)")]
    EmptyGrid {
        aisles: usize,
        seats_per_aisle: usize,
    },

    #[error("hold minimum {min_ms}ms exceeds maximum {max_ms}ms")]
    InvertedHold { min_ms: u64, max_ms: u64 },

    #[error("failed to read config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a whole booking run.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("customer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
