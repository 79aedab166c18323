//! SeatGrid: every seat unit of the theater and its exclusive lock.
//!
//! Each [`SeatUnit`] keeps its owner behind its own `tokio::sync::Mutex`, so
//! the lock and the state it guards are one value. Locks are only ever taken
//! with `try_lock`; the returned [`SeatLease`] is the proof of holding a seat
//! and the only way to read or change its owner. A lease that passed its free
//! check becomes a [`VacantSeat`]. Dropping either releases the seat.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::trace;

use crate::config::GridConfig;
use crate::error::{ConfigError, GridError};
use crate::seat::{CustomerId, SeatId};

/// State for one seat.
#[derive(Debug, Default)]
struct SeatUnit {
    owner: Mutex<Option<CustomerId>>,
}

/// The theater: a fixed aisles x seats grid of lockable seat units.
pub struct SeatGrid {
    aisles: usize,
    seats_per_aisle: usize,
    /// Row-major: index = aisle * seats_per_aisle + seat
    units: Vec<SeatUnit>,
}

impl fmt::Debug for SeatGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeatGrid")
            .field("aisles", &self.aisles)
            .field("seats_per_aisle", &self.seats_per_aisle)
            .finish()
    }
}

impl SeatGrid {
    /// Create an empty theater with every seat free and unlocked.
    pub fn new(config: &GridConfig) -> Result<Self, ConfigError> {
        if config.aisles == 0 || config.seats_per_aisle == 0 {
            return Err(ConfigError::EmptyGrid {
                aisles: config.aisles,
                seats_per_aisle: config.seats_per_aisle,
            });
        }

        let units = (0..config.capacity()).map(|_| SeatUnit::default()).collect();

        Ok(Self {
            aisles: config.aisles,
            seats_per_aisle: config.seats_per_aisle,
            units,
        })
    }

    pub fn aisles(&self) -> usize {
        self.aisles
    }

    pub fn seats_per_aisle(&self) -> usize {
        self.seats_per_aisle
    }

    /// Check whether a seat id falls inside the theater.
    pub fn contains(&self, seat: SeatId) -> bool {
        seat.aisle < self.aisles && seat.seat < self.seats_per_aisle
    }

    /// Reject out-of-range seats before any lock operation.
    pub fn validate(&self, seat: SeatId) -> Result<(), GridError> {
        if self.contains(seat) {
            Ok(())
        } else {
            Err(GridError::OutOfRange {
                seat,
                aisles: self.aisles,
                seats_per_aisle: self.seats_per_aisle,
            })
        }
    }

    fn unit(&self, seat: SeatId) -> Result<&SeatUnit, GridError> {
        self.validate(seat)?;
        let index = seat.aisle * self.seats_per_aisle + seat.seat;
        self.units.get(index).ok_or(GridError::OutOfRange {
            seat,
            aisles: self.aisles,
            seats_per_aisle: self.seats_per_aisle,
        })
    }

    /// Try to take a seat's lock without waiting.
    ///
    /// Returns `Ok(None)` immediately if the lock is held by anyone, including
    /// the calling task. Ownership is not inspected here; use
    /// [`SeatLease::is_free`] on the returned lease.
    pub fn try_acquire(&self, seat: SeatId) -> Result<Option<SeatLease<'_>>, GridError> {
        let unit = self.unit(seat)?;
        match unit.owner.try_lock() {
            Ok(guard) => {
                trace!(%seat, "Seat lock acquired");
                Ok(Some(SeatLease { seat, guard }))
            }
            Err(_) => {
                trace!(%seat, "Seat lock busy");
                Ok(None)
            }
        }
    }

    /// Read-only copy of every seat's owner.
    ///
    /// Waits for each seat's lock in turn, so a seat held by an attempt in
    /// flight is read after that attempt commits or rolls back.
    pub async fn snapshot(&self) -> GridSnapshot {
        let mut owners = Vec::with_capacity(self.units.len());
        for unit in &self.units {
            owners.push(*unit.owner.lock().await);
        }
        GridSnapshot {
            aisles: self.aisles,
            seats_per_aisle: self.seats_per_aisle,
            owners,
        }
    }
}

/// Exclusive hold on one seat's lock.
pub struct SeatLease<'a> {
    seat: SeatId,
    guard: MutexGuard<'a, Option<CustomerId>>,
}

impl fmt::Debug for SeatLease<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeatLease")
            .field("seat", &self.seat)
            .field("owner", &*self.guard)
            .finish()
    }
}

impl<'a> SeatLease<'a> {
    pub fn seat(&self) -> SeatId {
        self.seat
    }

    pub fn owner(&self) -> Option<CustomerId> {
        *self.guard
    }

    pub fn is_free(&self) -> bool {
        self.guard.is_none()
    }

    /// Book the seat for `customer`. A seat is never reassigned.
    pub fn assign(&mut self, customer: CustomerId) -> Result<(), GridError> {
        match *self.guard {
            Some(owner) => Err(GridError::AlreadyOwned {
                seat: self.seat,
                owner,
            }),
            None => {
                *self.guard = Some(customer);
                trace!(seat = %self.seat, %customer, "Seat assigned");
                Ok(())
            }
        }
    }

    /// Turn the lease into a [`VacantSeat`] if nobody owns the seat.
    ///
    /// On an owned seat the lease comes back with the owner, still held.
    pub fn into_vacant(self) -> Result<VacantSeat<'a>, (Self, CustomerId)> {
        match *self.guard {
            Some(owner) => Err((self, owner)),
            None => Ok(VacantSeat { lease: self }),
        }
    }

    /// Release the seat's lock.
    pub fn release(self) {
        trace!(seat = %self.seat, "Seat lock released");
    }
}

/// A held lease on a seat known to be unowned.
///
/// The seat stays locked for the lifetime of this value, so the free check
/// that produced it still holds and [`VacantSeat::assign`] cannot fail.
#[derive(Debug)]
pub struct VacantSeat<'a> {
    lease: SeatLease<'a>,
}

impl VacantSeat<'_> {
    pub fn seat(&self) -> SeatId {
        self.lease.seat
    }

    /// Book the seat for `customer` and keep holding its lock.
    pub fn assign(&mut self, customer: CustomerId) {
        *self.lease.guard = Some(customer);
        trace!(seat = %self.lease.seat, %customer, "Seat assigned");
    }

    pub fn release(self) {
        self.lease.release();
    }
}

/// Owner of every seat at one instant, row-major by aisle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    aisles: usize,
    seats_per_aisle: usize,
    owners: Vec<Option<CustomerId>>,
}

impl GridSnapshot {
    pub fn aisles(&self) -> usize {
        self.aisles
    }

    pub fn seats_per_aisle(&self) -> usize {
        self.seats_per_aisle
    }

    /// Owner of a seat, or `None` if it is free or outside the theater.
    pub fn owner(&self, seat: SeatId) -> Option<CustomerId> {
        if seat.aisle >= self.aisles || seat.seat >= self.seats_per_aisle {
            return None;
        }
        self.owners
            .get(seat.aisle * self.seats_per_aisle + seat.seat)
            .copied()
            .flatten()
    }

    /// Owners aisle by aisle.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<CustomerId>]> {
        self.owners.chunks(self.seats_per_aisle.max(1))
    }

    /// Every seat with its owner, in aisle-major order.
    pub fn seats(&self) -> impl Iterator<Item = (SeatId, Option<CustomerId>)> + '_ {
        self.rows().enumerate().flat_map(|(aisle, row)| {
            row.iter()
                .enumerate()
                .map(move |(seat, owner)| (SeatId::new(aisle, seat), *owner))
        })
    }

    pub fn booked_count(&self) -> usize {
        self.owners.iter().filter(|owner| owner.is_some()).count()
    }

    pub fn free_count(&self) -> usize {
        self.owners.len() - self.booked_count()
    }

    /// Seats booked by `customer`, in aisle-major order.
    pub fn seats_of(&self, customer: CustomerId) -> Vec<SeatId> {
        self.seats()
            .filter(|(_, owner)| *owner == Some(customer))
            .map(|(seat, _)| seat)
            .collect()
    }
}
