//! Random booking workload generator.
//!
//! Produces input text in the format read by [`crate::input`], with a tunable
//! share of attempts aimed at a small block of "hot" seats at the front of the
//! theater to force contention.

use std::fmt::Write as _;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use booking_kernel::GridConfig;

/// Seats per aisle in the hot block at the front of aisle 1.
const HOT_SEATS: usize = 4;

/// Configuration for workload generation.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Number of customers (ids 1..=customers)
    pub customers: usize,
    /// Attempts per customer, drawn from 1..=max_attempts
    pub max_attempts: usize,
    /// Seats per attempt, drawn from 1..=max_seats
    pub max_seats: usize,
    /// Theater dimensions to draw seats from
    pub grid: GridConfig,
    /// Probability (0.0 to 1.0) that an attempt targets the hot block
    pub contention: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            customers: 10,
            max_attempts: 3,
            max_seats: 3,
            grid: GridConfig::default(),
            contention: 0.5,
        }
    }
}

/// Generator for booking input files.
pub struct WorkloadGenerator {
    config: WorkloadConfig,
    rng: ChaCha8Rng,
}

impl WorkloadGenerator {
    /// Create a new generator. Without a seed the workload differs every run.
    pub fn new(mut config: WorkloadConfig, seed: Option<u64>) -> Self {
        if config.contention.is_nan() {
            warn!("Contention is NaN, using the default");
            config.contention = WorkloadConfig::default().contention;
        } else if !(0.0..=1.0).contains(&config.contention) {
            warn!(contention = config.contention, "Contention outside 0..=1, clamping");
            config.contention = config.contention.clamp(0.0, 1.0);
        }
        config.max_attempts = config.max_attempts.max(1);
        config.max_seats = config.max_seats.max(1);

        let seed = seed.unwrap_or_else(rand::random);
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate the input text.
    pub fn generate(&mut self) -> String {
        let all_seats: Vec<(usize, usize)> = (1..=self.config.grid.aisles)
            .flat_map(|aisle| (1..=self.config.grid.seats_per_aisle).map(move |seat| (aisle, seat)))
            .collect();
        let hot_seats: Vec<(usize, usize)> = all_seats
            .iter()
            .copied()
            .filter(|&(aisle, seat)| aisle == 1 && seat <= HOT_SEATS)
            .collect();

        let mut out = String::from("# customer, aisle, seat, aisle, seat, ...\n");

        for customer in 1..=self.config.customers {
            let attempts = self.rng.random_range(1..=self.config.max_attempts);
            for _ in 0..attempts {
                let wanted = self.rng.random_range(1..=self.config.max_seats);
                let hot = self.rng.random_bool(self.config.contention);
                let pool = if hot && !hot_seats.is_empty() {
                    &hot_seats
                } else {
                    &all_seats
                };
                let seats: Vec<&(usize, usize)> =
                    pool.choose_multiple(&mut self.rng, wanted).collect();
                if seats.is_empty() {
                    continue;
                }

                let _ = write!(out, "{}", customer);
                for (aisle, seat) in seats {
                    let _ = write!(out, ", {}, {}", aisle, seat);
                }
                out.push('\n');
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputLimits, parse_bookings};

    fn config() -> WorkloadConfig {
        WorkloadConfig {
            customers: 20,
            max_attempts: 4,
            max_seats: 5,
            grid: GridConfig {
                aisles: 3,
                seats_per_aisle: 6,
            },
            contention: 0.7,
        }
    }

    #[test]
    fn test_same_seed_same_workload() {
        let a = WorkloadGenerator::new(config(), Some(9)).generate();
        let b = WorkloadGenerator::new(config(), Some(9)).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_workload_parses_within_limits() {
        let text = WorkloadGenerator::new(config(), Some(1)).generate();
        let customers = parse_bookings(&text, &InputLimits::default()).unwrap();
        assert_eq!(customers.len(), 20);

        for customer in &customers {
            assert!((1..=4).contains(&customer.attempts().len()));
            for attempt in customer.attempts() {
                assert!(attempt.len() <= 5);
                let mut seats = attempt.seats().to_vec();
                seats.sort();
                seats.dedup();
                assert_eq!(seats.len(), attempt.len(), "generated duplicate seat");
                assert!(seats.iter().all(|s| s.aisle < 3 && s.seat < 6));
            }
        }
    }

    #[test]
    fn test_full_contention_targets_hot_block() {
        let mut cfg = config();
        cfg.contention = 1.0;
        cfg.max_seats = 2;
        let text = WorkloadGenerator::new(cfg, Some(4)).generate();
        let customers = parse_bookings(&text, &InputLimits::default()).unwrap();
        for attempt in customers.iter().flat_map(|c| c.attempts()) {
            assert!(attempt.seats().iter().all(|s| s.aisle == 0 && s.seat < HOT_SEATS));
        }
    }

    #[test]
    fn test_out_of_range_contention_clamped() {
        let mut cfg = config();
        cfg.contention = 3.0;
        let generator = WorkloadGenerator::new(cfg, Some(1));
        assert_eq!(generator.config.contention, 1.0);

        let mut cfg = config();
        cfg.contention = f64::NEG_INFINITY;
        let generator = WorkloadGenerator::new(cfg, Some(1));
        assert_eq!(generator.config.contention, 0.0);
    }

    #[test]
    fn test_nan_contention_falls_back_to_default() {
        let mut cfg = config();
        cfg.contention = f64::NAN;
        let mut generator = WorkloadGenerator::new(cfg, Some(1));
        assert_eq!(generator.config.contention, WorkloadConfig::default().contention);

        let text = generator.generate();
        let customers = parse_bookings(&text, &InputLimits::default()).unwrap();
        assert_eq!(customers.len(), 20);
    }
}
