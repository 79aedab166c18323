//! Input ingestion: customer booking requests from text.
//!
//! One attempt per line:
//!
//! ```text
//! # customer, aisle, seat, aisle, seat, ...
//! 1, 1, 1, 1, 2
//! 2, 1, 1      # second customer wants the same seat
//! 1, 3, 4      # customer 1's fallback attempt
//! ```
//!
//! Tokens are separated by commas and/or whitespace. Seat numbers are
//! 1-based and not checked against the theater here, so `0` or `99` reach
//! the booking kernel and fail there as out of range. Blank lines, comments
//! and lines not starting with a digit are skipped. Lines for the same
//! customer append attempts in file order.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use booking_kernel::{Attempt, Customer, CustomerId, SeatId};
use tracing::{debug, warn};

/// Capacity limits enforced while reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    pub max_customers: usize,
    pub max_attempts_per_customer: usize,
    pub max_seats_per_attempt: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_customers: 50,
            max_attempts_per_customer: 10,
            max_seats_per_attempt: 60,
        }
    }
}

/// Read and parse a booking file.
pub fn load_bookings(path: impl AsRef<Path>, limits: &InputLimits) -> Result<Vec<Customer>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Error opening file {}", path.display()))?;
    parse_bookings(&text, limits)
}

/// Parse booking requests, keeping customers in first-seen order.
pub fn parse_bookings(text: &str, limits: &InputLimits) -> Result<Vec<Customer>> {
    let mut customers: Vec<Customer> = Vec::new();
    let mut index: HashMap<CustomerId, usize> = HashMap::new();

    for (line_no, raw) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let Some((id, seats)) = parse_line(raw, line_no) else {
            continue;
        };

        if seats.len() > limits.max_seats_per_attempt {
            bail!(
                "Line {}: {} seats requested, at most {} per attempt",
                line_no,
                seats.len(),
                limits.max_seats_per_attempt
            );
        }

        let Some(attempt) = Attempt::new(seats) else {
            continue;
        };

        let slot = match index.get(&id) {
            Some(&slot) => slot,
            None => {
                if customers.len() >= limits.max_customers {
                    bail!("Maximum number of customers exceeded ({})", limits.max_customers);
                }
                customers.push(Customer::new(id));
                index.insert(id, customers.len() - 1);
                customers.len() - 1
            }
        };

        let Some(customer) = customers.get_mut(slot) else {
            continue;
        };
        if customer.attempts().len() >= limits.max_attempts_per_customer {
            bail!(
                "Maximum attempts per customer exceeded ({}) for customer {}",
                limits.max_attempts_per_customer,
                id
            );
        }
        customer.push_attempt(attempt);
    }

    debug!(
        customers = customers.len(),
        attempts = customers.iter().map(|c| c.attempts().len()).sum::<usize>(),
        "Parsed booking input"
    );

    Ok(customers)
}

/// Parse one line into a customer id and its requested seats.
///
/// Returns `None` for lines that carry no request.
fn parse_line(raw: &str, line_no: usize) -> Option<(CustomerId, Vec<SeatId>)> {
    let content = raw.split('#').next().unwrap_or_default().trim();
    if content.is_empty() {
        return None;
    }
    if !content.starts_with(|c: char| c.is_ascii_digit()) {
        debug!(line = line_no, "Skipping non-data line");
        return None;
    }

    let mut tokens = content
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty());

    let id = match tokens.next().map(str::parse::<u32>) {
        Some(Ok(id)) => CustomerId(id),
        _ => {
            warn!(line = line_no, "Skipping line with invalid customer id");
            return None;
        }
    };

    let mut seats = Vec::new();
    loop {
        let Some(aisle) = tokens.next().and_then(parse_position) else {
            break;
        };
        let Some(seat) = tokens.next().and_then(parse_position) else {
            warn!(
                line = line_no,
                customer = %id,
                "Incomplete seat request, keeping pairs read so far"
            );
            break;
        };
        seats.push(SeatId::from_one_based(aisle, seat));
    }

    if seats.is_empty() {
        warn!(line = line_no, customer = %id, "Skipping line without seat requests");
        return None;
    }

    Some((id, seats))
}

/// A 1-based aisle or seat number. Negative or non-numeric tokens are invalid.
fn parse_position(token: &str) -> Option<usize> {
    token.parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(customer: &Customer) -> Vec<Vec<(usize, usize)>> {
        customer
            .attempts()
            .iter()
            .map(|a| a.seats().iter().map(|s| (s.aisle + 1, s.seat + 1)).collect())
            .collect()
    }

    #[test]
    fn test_parse_groups_attempts_by_customer() {
        let input = "\
# Customer, Aisle, Seat
Customer, Aisle, Seat

1, 1, 1, 1, 2
2, 1, 1   # contested
1,3,4
   2 2 5
";
        let customers = parse_bookings(input, &InputLimits::default()).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].id(), CustomerId(1));
        assert_eq!(seats(&customers[0]), vec![vec![(1, 1), (1, 2)], vec![(3, 4)]]);
        assert_eq!(customers[1].id(), CustomerId(2));
        assert_eq!(seats(&customers[1]), vec![vec![(1, 1)], vec![(2, 5)]]);
    }

    #[test]
    fn test_pair_parsing_stops_at_bad_token() {
        let input = "7, 1, 2, x, 3\n8, 2\n9, 1, 1, 4\n10, -1, 3\n11abc, 1, 1\n";
        let customers = parse_bookings(input, &InputLimits::default()).unwrap();
        let ids: Vec<u32> = customers.iter().map(|c| c.id().0).collect();
        assert_eq!(ids, vec![7, 9]);
        assert_eq!(seats(&customers[0]), vec![vec![(1, 2)]]);
        // Dangling aisle is dropped, the complete pair is kept.
        assert_eq!(seats(&customers[1]), vec![vec![(1, 1)]]);
    }

    #[test]
    fn test_out_of_grid_seats_pass_through() {
        let customers = parse_bookings("3, 9, 40\n", &InputLimits::default()).unwrap();
        assert_eq!(customers[0].attempts()[0].seats(), &[SeatId::new(8, 39)]);
    }

    #[test]
    fn test_zero_position_is_kept_as_a_request() {
        let customers = parse_bookings("10, 0, 3, 1, 1\n", &InputLimits::default()).unwrap();
        let requested = customers[0].attempts()[0].seats();
        assert_eq!(requested, &[SeatId::from_one_based(0, 3), SeatId::new(0, 0)]);
        assert_eq!(requested[0].to_string(), "Aisle 0, Seat 3");
    }

    #[test]
    fn test_capacity_limits_are_fatal() {
        let limits = InputLimits {
            max_customers: 2,
            max_attempts_per_customer: 2,
            max_seats_per_attempt: 2,
        };

        let err = parse_bookings("1,1,1\n2,1,1\n3,1,1\n", &limits).unwrap_err();
        assert!(err.to_string().contains("Maximum number of customers"));

        let err = parse_bookings("1,1,1\n1,1,2\n1,1,3\n", &limits).unwrap_err();
        assert!(err.to_string().contains("Maximum attempts per customer"));

        let err = parse_bookings("1,1,1,1,2,1,3\n", &limits).unwrap_err();
        assert!(err.to_string().contains("at most 2 per attempt"));
    }

    #[test]
    fn test_sample_file_parses() {
        let text = include_str!("../data/sample_bookings.txt");
        let customers = parse_bookings(text, &InputLimits::default()).unwrap();
        let ids: Vec<u32> = customers.iter().map(|c| c.id().0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(seats(&customers[1]), vec![vec![(1, 2), (1, 3)], vec![(3, 5), (3, 6)]]);
        assert_eq!(seats(&customers[5]), vec![vec![(2, 7), (2, 7)]]);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_bookings("/nonexistent/bookings.txt", &InputLimits::default()).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/bookings.txt"));
    }
}
