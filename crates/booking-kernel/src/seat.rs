//! Seat and customer identities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-supplied customer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u32);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CustomerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Zero-based seat coordinate within the grid.
///
/// Displayed 1-based (`Aisle 1, Seat 1` is `SeatId { aisle: 0, seat: 0 }`),
/// which is how customers and reports refer to seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatId {
    pub aisle: usize,
    pub seat: usize,
}

impl SeatId {
    pub const fn new(aisle: usize, seat: usize) -> Self {
        Self { aisle, seat }
    }

    /// Convert 1-based aisle/seat numbers.
    ///
    /// A 0 wraps to `usize::MAX`, which lies outside every grid and still
    /// displays as 0.
    pub const fn from_one_based(aisle: usize, seat: usize) -> Self {
        Self::new(aisle.wrapping_sub(1), seat.wrapping_sub(1))
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Aisle {}, Seat {}",
            self.aisle.wrapping_add(1),
            self.seat.wrapping_add(1)
        )
    }
}

/// Render a seat list the way event lines print it.
pub fn format_seats(seats: &[SeatId]) -> String {
    seats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_based_conversion() {
        assert_eq!(SeatId::from_one_based(1, 1), SeatId::new(0, 0));
        assert_eq!(SeatId::from_one_based(3, 12), SeatId::new(2, 11));
    }

    #[test]
    fn test_zero_position_round_trips_through_display() {
        let seat = SeatId::from_one_based(0, 3);
        assert_eq!(seat.aisle, usize::MAX);
        assert_eq!(seat.to_string(), "Aisle 0, Seat 3");
        assert_eq!(SeatId::from_one_based(2, 0).to_string(), "Aisle 2, Seat 0");
    }

    #[test]
    fn test_seat_list_display() {
        let seats = [SeatId::new(0, 0), SeatId::new(1, 4)];
        assert_eq!(format_seats(&seats), "Aisle 1, Seat 1, Aisle 2, Seat 5");
        assert_eq!(format_seats(&[]), "");
    }
}
