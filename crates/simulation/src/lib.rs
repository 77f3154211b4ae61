//! Monte Carlo engine comparing buy-and-hold against hashrate mining.
//!
//! The pipeline is: drift calibration, correlated shock generation, GBM
//! price paths for both reference series, per-path strategy evaluation and
//! a final statistics reduction.

/// Prelude module for convenient imports.
pub mod prelude;

/// Drift calibration.
pub mod calibration;
/// Mining production model.
pub mod economics;
/// Per-path strategy valuation.
pub mod evaluator;
/// Run orchestration and cancellation.
pub mod monte_carlo;
/// Price path generators.
pub mod price_path;
/// Correlated normal draws.
pub mod random;
/// Ensemble statistics.
pub mod statistics;
