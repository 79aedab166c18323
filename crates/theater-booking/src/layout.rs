//! Seat layout display.

use std::fmt;

use booking_kernel::GridSnapshot;

/// Table of the final seat owners, one row per aisle.
///
/// ```text
///           1   2   3
/// Aisle 1   001 001 ---
/// Aisle 2   --- 012 ---
/// ```
///
/// Owners are zero-padded to three digits; free seats show `---`.
pub struct Layout<'a>(pub &'a GridSnapshot);

impl fmt::Display for Layout<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;

        write!(f, "{:10}", "")?;
        for seat in 1..=snapshot.seats_per_aisle() {
            write!(f, "{:<4}", seat)?;
        }
        writeln!(f)?;

        for (aisle, row) in snapshot.rows().enumerate() {
            write!(f, "Aisle {:<2}  ", aisle + 1)?;
            for owner in row {
                let cell = match owner {
                    Some(customer) => format!("{:03}", customer.0),
                    None => "---".to_string(),
                };
                write!(f, "{:<4}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_kernel::{CustomerId, GridConfig, SeatGrid, SeatId};

    #[tokio::test]
    async fn test_layout_matches_report_format() {
        let grid = SeatGrid::new(&GridConfig {
            aisles: 2,
            seats_per_aisle: 3,
        })
        .unwrap();
        let booked = [
            (SeatId::new(0, 0), 1),
            (SeatId::new(0, 1), 1),
            (SeatId::new(1, 1), 1234),
        ];
        for (seat, customer) in booked {
            let mut lease = grid.try_acquire(seat).unwrap().unwrap();
            lease.assign(CustomerId(customer)).unwrap();
        }

        let rendered = Layout(&grid.snapshot().await).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "          1   2   3   ");
        assert_eq!(lines[1], "Aisle 1   001 001 --- ");
        assert_eq!(lines[2], "Aisle 2   --- 1234--- ");
        assert_eq!(lines.len(), 3);
    }
}
