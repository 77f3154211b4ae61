//! Error types shared by the simulation crates.

use thiserror::Error;

/// Errors raised while validating a configuration or running a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A configuration value is outside its valid range.
    #[error("invalid parameter `{name}` = {value}: expected {expected}")]
    InvalidParameter {
        /// Parameter name as it appears in the configuration.
        name: &'static str,
        /// Offending value, rendered for display.
        value: String,
        /// Human readable description of the valid range.
        expected: &'static str,
    },
    /// A denominator or growth factor collapsed to zero or below.
    #[error("degenerate distribution: {0}")]
    DegenerateDistribution(String),
    /// A statistic was requested over an empty sample.
    #[error("statistic requested over an empty sample")]
    EmptySample,
    /// The run was cancelled between path batches.
    #[error("simulation cancelled")]
    Cancelled,
}

impl SimulationError {
    /// Shorthand for building an [`SimulationError::InvalidParameter`].
    pub fn invalid(name: &'static str, value: impl ToString, expected: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            expected,
        }
    }
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, SimulationError>;
