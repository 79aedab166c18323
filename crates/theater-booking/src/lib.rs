//! Theater booking harness.
//!
//! Everything around the booking kernel that a complete run needs:
//! - reading customer requests from the line-oriented input format
//! - rendering the final seat layout
//! - summarising and saving run reports
//! - generating random contended workloads

pub mod generator;
pub mod input;
pub mod layout;
pub mod report;
