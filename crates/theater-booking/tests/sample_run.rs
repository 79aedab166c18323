//! End-to-end run of the bundled sample input.

use booking_kernel::{AttemptError, BookingConfig, BookingKernel, CustomerId, HoldConfig, SeatId};
use theater_booking::input::{InputLimits, parse_bookings};
use theater_booking::layout::Layout;
use theater_booking::report::RunSummary;

const SAMPLE: &str = include_str!("../data/sample_bookings.txt");

fn seat(aisle: usize, seat: usize) -> SeatId {
    SeatId::from_one_based(aisle, seat)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sample_input_run() {
    let customers = parse_bookings(SAMPLE, &InputLimits::default()).unwrap();
    let config = BookingConfig {
        hold: HoldConfig { min_ms: 0, max_ms: 3 },
        seed: Some(5),
        ..BookingConfig::default()
    };
    let kernel = BookingKernel::new(config).unwrap();
    let outcome = kernel.run(customers).await.unwrap();

    assert_eq!(outcome.events.len(), 10);

    // Uncontended requests always land.
    assert_eq!(outcome.snapshot.owner(seat(5, 12)), Some(CustomerId(4)));
    assert_eq!(outcome.snapshot.owner(seat(2, 1)), Some(CustomerId(5)));
    assert_eq!(outcome.snapshot.owner(seat(3, 5)), Some(CustomerId(2)));
    assert_eq!(outcome.snapshot.owner(seat(3, 6)), Some(CustomerId(2)));

    let reason_of = |id: u32| {
        outcome
            .events
            .iter()
            .filter(|e| e.customer == CustomerId(id))
            .filter_map(|e| e.outcome.reason().cloned())
            .collect::<Vec<_>>()
    };
    assert!(matches!(
        reason_of(4).as_slice(),
        [AttemptError::AlreadyOwned { owner: CustomerId(4), .. }]
    ));
    assert!(matches!(reason_of(6).as_slice(), [AttemptError::Duplicate { .. }]));
    assert!(matches!(reason_of(7).as_slice(), [AttemptError::OutOfRange { .. }]));
    assert_eq!(outcome.snapshot.owner(seat(2, 7)), None);

    // Seat 1-1 went to exactly one of the customers asking for it.
    let front = outcome.snapshot.owner(seat(1, 1));
    assert!(matches!(front, Some(CustomerId(1 | 3 | 5))));

    let summary = RunSummary::from_outcome(&outcome);
    assert_eq!(summary.attempts, 10);
    assert_eq!(summary.successes + summary.failures, 10);
    assert_eq!(summary.seats_total, 60);

    let layout = Layout(&outcome.snapshot).to_string();
    assert_eq!(layout.lines().count(), 6);
    assert!(layout.lines().nth(5).unwrap().ends_with("004 "));
}

#[tokio::test]
async fn test_zero_seat_number_fails_as_out_of_range() {
    let customers = parse_bookings("10, 0, 3\n11, 1, 1\n", &InputLimits::default()).unwrap();
    let config = BookingConfig {
        hold: HoldConfig::zero(),
        ..BookingConfig::default()
    };
    let outcome = BookingKernel::new(config).unwrap().run(customers).await.unwrap();

    let line = |id: u32| {
        outcome
            .events
            .iter()
            .find(|e| e.customer == CustomerId(id))
            .map(ToString::to_string)
    };
    assert_eq!(line(10).as_deref(), Some("Customer 10 - Fail - Aisle 0, Seat 3"));
    assert_eq!(line(11).as_deref(), Some("Customer 11 - Success - Aisle 1, Seat 1"));
    assert_eq!(outcome.snapshot.booked_count(), 1);
}
