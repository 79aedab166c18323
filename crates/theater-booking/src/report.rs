//! Run reports: summary statistics and JSON output.
//!
//! Captures:
//! - attempt outcomes, with failures tallied by reason
//! - seat occupancy of the final layout
//! - seats booked per customer
//! - the full event log and final snapshot

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use booking_kernel::{BookingConfig, BookingEvent, CustomerId, GridSnapshot, RunOutcome};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seats held by one customer at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSeats {
    pub customer: CustomerId,
    pub attempts: usize,
    pub successes: usize,
    pub seats: usize,
}

/// Aggregate statistics for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub customers: usize,
    pub attempts: usize,
    pub successes: usize,
    pub failures: usize,
    /// Failure count per reason kind (`contended`, `already_owned`, ...)
    pub failures_by_reason: BTreeMap<String, usize>,
    pub seats_total: usize,
    pub seats_booked: usize,
    pub seats_free: usize,
    /// Booked share of the theater (0.0 to 1.0)
    pub occupancy: f64,
    pub per_customer: Vec<CustomerSeats>,
}

impl RunSummary {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let successes = outcome.events.iter().filter(|e| e.is_success()).count();

        let mut failures_by_reason = BTreeMap::new();
        for reason in outcome.events.iter().filter_map(|e| e.outcome.reason()) {
            *failures_by_reason.entry(reason.kind().to_string()).or_insert(0) += 1;
        }

        let seats_booked = outcome.snapshot.booked_count();
        let seats_free = outcome.snapshot.free_count();
        let seats_total = seats_booked + seats_free;
        let occupancy = if seats_total > 0 {
            seats_booked as f64 / seats_total as f64
        } else {
            0.0
        };

        let per_customer = outcome
            .customers
            .iter()
            .map(|c| CustomerSeats {
                customer: c.customer,
                attempts: c.outcomes.len(),
                successes: c.successes(),
                seats: outcome.snapshot.seats_of(c.customer).len(),
            })
            .collect();

        Self {
            customers: outcome.customers.len(),
            attempts: outcome.events.len(),
            successes,
            failures: outcome.events.len() - successes,
            failures_by_reason,
            seats_total,
            seats_booked,
            seats_free,
            occupancy,
            per_customer,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Customers: {}", self.customers)?;
        writeln!(
            f,
            "Attempts: {} ({} succeeded, {} failed)",
            self.attempts, self.successes, self.failures
        )?;
        for (reason, count) in &self.failures_by_reason {
            writeln!(f, "  {}: {}", reason, count)?;
        }
        write!(
            f,
            "Seats booked: {}/{} ({:.1}%)",
            self.seats_booked,
            self.seats_total,
            self.occupancy * 100.0
        )
    }
}

/// Everything recorded about one run, as saved to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Input file the bookings were read from
    pub input: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub config: BookingConfig,
    pub summary: RunSummary,
    pub events: Vec<BookingEvent>,
    pub snapshot: GridSnapshot,
}

impl RunReport {
    pub fn new(
        config: BookingConfig,
        input: Option<PathBuf>,
        started_at: DateTime<Utc>,
        outcome: RunOutcome,
    ) -> Self {
        let summary = RunSummary::from_outcome(&outcome);
        Self {
            run_id: Uuid::new_v4(),
            input,
            started_at,
            ended_at: Utc::now(),
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            config,
            summary,
            events: outcome.events,
            snapshot: outcome.snapshot,
        }
    }

    /// Save the report to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let report = serde_json::from_str(&json)?;
        Ok(report)
    }

    /// Where to save this run, derived from a user-given path.
    ///
    /// The run's local start time and the first block of its id are spliced
    /// into the file name, so repeated runs never overwrite each other:
    /// `out/report.json` becomes `out/report-20261015-093000-1a2b3c4d.json`.
    pub fn output_path(&self, requested: &Path) -> PathBuf {
        let stem = requested
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("booking-run");
        let ext = requested
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("json");
        let started = self
            .started_at
            .with_timezone(&Local)
            .format("%Y%m%d-%H%M%S");
        let run = self.run_id.simple().to_string();
        let short_id = run.get(..8).unwrap_or(&run);
        requested.with_file_name(format!("{stem}-{started}-{short_id}.{ext}"))
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Render a run's wall time: `850ms`, `2.25s` or `3m 07s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1_000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else {
        let secs = elapsed.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
