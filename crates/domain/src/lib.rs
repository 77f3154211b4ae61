//! Domain types for the hashrate-versus-hold Monte Carlo calculator.
//!
//! This crate holds the run configuration, its validation rules, the error
//! type shared by the workspace and the value objects a run produces.

/// Run configuration.
pub mod config;
/// Error types.
pub mod error;
/// Mining operation parameters.
pub mod mining;
/// Value objects produced by a run.
pub mod value_objects;

pub use config::{AssetSeriesConfig, SimulationConfig};
pub use error::{Result, SimulationError};
pub use mining::{HalvingSchedule, MiningEconomicsParameters};
