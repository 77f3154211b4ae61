//! Drift calibration for GBM price paths.
//!
//! The target price supplied by the user is treated as the median terminal
//! price. Under GBM the median of `S_T` is `S_0 * exp((mu - sigma^2 / 2) T)`,
//! so the `sigma^2 / 2` term is added back to the log growth rate.

use minesim_domain::config::AssetSeriesConfig;
use minesim_domain::error::{Result, SimulationError};

/// Computes the annual drift that puts the median terminal price on `target`.
///
/// `drift = ln(target / start) / horizon + 0.5 * volatility^2`
pub fn calibrate_drift(
    start: f64,
    target: f64,
    horizon_years: u32,
    volatility: f64,
) -> Result<f64> {
    if horizon_years < 1 {
        return Err(SimulationError::invalid(
            "horizon_years",
            horizon_years,
            "at least 1 year",
        ));
    }
    if !(start.is_finite() && start > 0.0) {
        return Err(SimulationError::invalid("start_price", start, "a price greater than 0"));
    }
    if !(target.is_finite() && target > 0.0) {
        return Err(SimulationError::invalid("target_price", target, "a price greater than 0"));
    }
    if !(volatility.is_finite() && volatility >= 0.0) {
        return Err(SimulationError::invalid(
            "volatility",
            volatility,
            "a non-negative finite volatility",
        ));
    }

    Ok((target / start).ln() / f64::from(horizon_years) + 0.5 * volatility * volatility)
}

/// A price series with its calibrated GBM parameters, in `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedSeries {
    pub name: String,
    pub start: f64,
    pub drift: f64,
    pub volatility: f64,
}

impl CalibratedSeries {
    /// Calibrates `series` over `horizon_years`.
    pub fn calibrate(series: &AssetSeriesConfig, horizon_years: u32) -> Result<Self> {
        let start = series.start_f64()?;
        let target = series.target_f64()?;
        let drift = calibrate_drift(start, target, horizon_years, series.volatility)?;
        Ok(Self {
            name: series.name.clone(),
            start,
            drift,
            volatility: series.volatility,
        })
    }
}
