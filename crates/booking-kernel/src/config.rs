//! Configuration types for the kernel.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level booking configuration.
///
/// Defines the theater dimensions and the simulated hold between acquiring a
/// bundle and committing it. Loaded from JSON at runtime; every field has a
/// default so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Theater dimensions
    pub grid: GridConfig,

    /// Hold duration bounds
    pub hold: HoldConfig,

    /// Seed for per-customer hold rngs (None for entropy)
    pub seed: Option<u64>,
}

/// Theater dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of aisles
    pub aisles: usize,

    /// Seats in every aisle
    pub seats_per_aisle: usize,
}

/// Bounds for the simulated hold, in milliseconds, inclusive on both ends.
///
/// A zero hold skips the sleep entirely, which tests rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldConfig {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            aisles: 5,
            seats_per_aisle: 12,
        }
    }
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            min_ms: 1_000,
            max_ms: 3_000,
        }
    }
}

impl HoldConfig {
    /// No hold at all.
    pub const fn zero() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    /// A fixed hold of `ms` milliseconds.
    pub const fn fixed(ms: u64) -> Self {
        Self {
            min_ms: ms,
            max_ms: ms,
        }
    }
}

impl GridConfig {
    pub fn capacity(&self) -> usize {
        self.aisles.saturating_mul(self.seats_per_aisle)
    }
}

impl BookingConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.aisles == 0 || self.grid.seats_per_aisle == 0 {
            return Err(ConfigError::EmptyGrid {
                aisles: self.grid.aisles,
                seats_per_aisle: self.grid.seats_per_aisle,
            });
        }
        if self.hold.min_ms > self.hold.max_ms {
            return Err(ConfigError::InvertedHold {
                min_ms: self.hold.min_ms,
                max_ms: self.hold.max_ms,
            });
        }
        Ok(())
    }
}
