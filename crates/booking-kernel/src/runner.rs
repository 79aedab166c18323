//! Customers, their attempts, and the runner that drives them.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::Outcome;
use crate::executor::AttemptExecutor;
use crate::seat::{CustomerId, SeatId};

/// One seating request: a non-empty, ordered bundle of seats.
///
/// The order is the lock-acquisition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    seats: Vec<SeatId>,
}

impl Attempt {
    /// Build an attempt. Returns `None` for an empty seat list.
    pub fn new(seats: impl IntoIterator<Item = SeatId>) -> Option<Self> {
        let seats: Vec<SeatId> = seats.into_iter().collect();
        if seats.is_empty() {
            None
        } else {
            Some(Self { seats })
        }
    }

    pub fn seats(&self) -> &[SeatId] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

/// A customer and their attempts in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    id: CustomerId,
    attempts: Vec<Attempt>,
}

impl Customer {
    pub fn new(id: CustomerId) -> Self {
        Self {
            id,
            attempts: Vec::new(),
        }
    }

    pub fn with_attempts(id: CustomerId, attempts: Vec<Attempt>) -> Self {
        Self { id, attempts }
    }

    pub fn push_attempt(&mut self, attempt: Attempt) {
        self.attempts.push(attempt);
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }
}

/// Outcomes of every attempt of one customer, in attempt order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOutcome {
    pub customer: CustomerId,
    pub outcomes: Vec<Outcome>,
}

impl CustomerOutcome {
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }
}

/// Drives one customer's attempts strictly one after another.
///
/// Every attempt runs to success or failure before the next starts. Earlier
/// successes do not stop later attempts; a customer may book several bundles.
pub struct CustomerRunner {
    customer: Customer,
    executor: AttemptExecutor,
    rng: StdRng,
}

impl CustomerRunner {
    /// Create a runner. With a seed the hold durations are reproducible per
    /// customer; without one they come from OS entropy.
    pub fn new(customer: Customer, executor: AttemptExecutor, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ u64::from(customer.id().0)),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            customer,
            executor,
            rng,
        }
    }

    pub async fn run(mut self) -> CustomerOutcome {
        let id = self.customer.id();
        let total = self.customer.attempts().len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, attempt) in self.customer.attempts().iter().enumerate() {
            debug!(customer = %id, attempt = index + 1, total, "Starting attempt");
            let outcome = self.executor.execute(id, attempt, &mut self.rng).await;
            outcomes.push(outcome);
        }

        debug!(
            customer = %id,
            succeeded = outcomes.iter().filter(|o| o.is_success()).count(),
            total,
            "Customer finished"
        );

        CustomerOutcome {
            customer: id,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{GridConfig, HoldConfig};
    use crate::error::AttemptError;
    use crate::events::EventSink;
    use crate::grid::SeatGrid;

    fn attempt(seats: &[(usize, usize)]) -> Attempt {
        Attempt::new(seats.iter().map(|&(a, s)| SeatId::new(a, s))).unwrap()
    }

    fn executor() -> AttemptExecutor {
        let grid = SeatGrid::new(&GridConfig {
            aisles: 2,
            seats_per_aisle: 2,
        })
        .unwrap();
        AttemptExecutor::new(Arc::new(grid), Arc::new(EventSink::new()), HoldConfig::zero())
    }

    #[test]
    fn test_empty_attempt_rejected() {
        assert!(Attempt::new(Vec::new()).is_none());
        assert_eq!(attempt(&[(0, 1)]).len(), 1);
    }

    #[tokio::test]
    async fn test_attempts_run_in_order_and_continue_after_failure() {
        let exec = executor();
        let customer = Customer::with_attempts(
            CustomerId(6),
            vec![
                attempt(&[(0, 0), (0, 0)]),
                attempt(&[(0, 1)]),
                attempt(&[(0, 1)]),
                attempt(&[(1, 0), (1, 1)]),
            ],
        );

        let result = CustomerRunner::new(customer, exec.clone(), Some(1)).run().await;
        assert_eq!(result.customer, CustomerId(6));
        assert_eq!(result.outcomes.len(), 4);
        assert_eq!(result.successes(), 2);
        assert!(matches!(
            result.outcomes[0].reason(),
            Some(AttemptError::Duplicate { .. })
        ));
        assert!(result.outcomes[1].is_success());
        // The customer's own earlier booking makes the repeat fail.
        assert!(matches!(
            result.outcomes[2].reason(),
            Some(AttemptError::AlreadyOwned { owner: CustomerId(6), .. })
        ));
        assert!(result.outcomes[3].is_success());

        let logged: Vec<bool> = exec.sink().events().iter().map(|e| e.is_success()).collect();
        assert_eq!(logged, vec![false, true, false, true]);
    }

    #[tokio::test]
    async fn test_customer_without_attempts_finishes() {
        let result = CustomerRunner::new(Customer::new(CustomerId(1)), executor(), None)
            .run()
            .await;
        assert!(result.outcomes.is_empty());
    }
}
