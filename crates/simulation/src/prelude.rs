//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use minesim_simulation::prelude::*;
//! ```

// Calibration
pub use crate::calibration::{CalibratedSeries, calibrate_drift};

// Mining economics
pub use crate::economics::{
    YearlyProduction, investor_btc, network_share, total_btc_mined, yearly_production,
};

// Evaluation
pub use crate::evaluator::{MiningPosition, StrategyEvaluator, evaluate_path};

// Monte Carlo
pub use crate::monte_carlo::{CancellationToken, MonteCarloRunner, run};

// Price path generators
pub use crate::price_path::{
    DeterministicPricePath, GeometricBrownianMotion, PricePathGenerator, simulate_ensemble,
};

// Random draws
pub use crate::random::{CorrelatedDraws, CorrelatedNormalGenerator, NormalMatrix};

// Statistics
pub use crate::statistics::{aggregate, histogram, percentile, win_rate};
