//! Simulation run configuration.
//!
//! A [`SimulationConfig`] is assembled once, validated with
//! [`SimulationConfig::validate`], and then only read by the engine.

use crate::error::{Result, SimulationError};
use crate::mining::{MiningEconomicsParameters, decimal_to_f64};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Smallest accepted path count.
pub const MIN_PATHS: usize = 100;
/// Largest accepted path count.
pub const MAX_PATHS: usize = 10_000;
/// Longest accepted horizon in years.
pub const MAX_HORIZON_YEARS: u32 = 100;
/// Default number of paths kept verbatim for reporting.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;
/// Default histogram bin count.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Price assumptions for one reference series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeriesConfig {
    /// Display name (e.g. "BTC").
    pub name: String,
    /// Price at year 0.
    pub start_price: Decimal,
    /// Median price expected at the end of the horizon.
    pub target_price: Decimal,
    /// Annualized volatility of log returns.
    pub volatility: f64,
}

impl AssetSeriesConfig {
    /// Creates a new series description.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        start_price: Decimal,
        target_price: Decimal,
        volatility: f64,
    ) -> Self {
        Self {
            name: name.into(),
            start_price,
            target_price,
            volatility,
        }
    }

    /// Start price as `f64`.
    pub fn start_f64(&self) -> Result<f64> {
        decimal_to_f64("start_price", self.start_price)
    }

    /// Target price as `f64`.
    pub fn target_f64(&self) -> Result<f64> {
        decimal_to_f64("target_price", self.target_price)
    }

    fn validate(&self, prefix: Prefix) -> Result<()> {
        if self.start_price <= Decimal::ZERO {
            return Err(SimulationError::invalid(
                prefix.start,
                self.start_price,
                "a price greater than 0",
            ));
        }
        if self.target_price <= Decimal::ZERO {
            return Err(SimulationError::invalid(
                prefix.target,
                self.target_price,
                "a price greater than 0",
            ));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(SimulationError::invalid(
                prefix.volatility,
                self.volatility,
                "a non-negative finite volatility",
            ));
        }
        self.start_f64()?;
        self.target_f64()?;
        Ok(())
    }
}

struct Prefix {
    start: &'static str,
    target: &'static str,
    volatility: &'static str,
}

const PRIMARY: Prefix = Prefix {
    start: "primary.start_price",
    target: "primary.target_price",
    volatility: "primary.volatility",
};

const SECONDARY: Prefix = Prefix {
    start: "secondary.start_price",
    target: "secondary.target_price",
    volatility: "secondary.volatility",
};

/// Configuration for a Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of simulated paths.
    pub paths: usize,
    /// Horizon in whole years.
    pub horizon_years: u32,
    /// Series both strategies are valued in.
    pub primary: AssetSeriesConfig,
    /// Correlated reference series.
    pub secondary: AssetSeriesConfig,
    /// Correlation between the two series' shocks.
    pub correlation: f64,
    /// Capital committed by the investor.
    pub invested_capital: Decimal,
    /// Mining operation inputs.
    #[serde(default)]
    pub mining: MiningEconomicsParameters,
    /// Seed for reproducible runs. `None` draws one per run.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of leading paths kept verbatim in the report.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Histogram bin count.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

impl SimulationConfig {
    /// Creates a config with 1000 paths, uncorrelated series and an
    /// unconfigured mining operation.
    #[must_use]
    pub fn new(
        horizon_years: u32,
        primary: AssetSeriesConfig,
        secondary: AssetSeriesConfig,
        invested_capital: Decimal,
    ) -> Self {
        Self {
            paths: 1000,
            horizon_years,
            primary,
            secondary,
            correlation: 0.0,
            invested_capital,
            mining: MiningEconomicsParameters::default(),
            seed: None,
            sample_size: DEFAULT_SAMPLE_SIZE,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }

    /// Sets the number of paths.
    #[must_use]
    pub fn with_paths(mut self, paths: usize) -> Self {
        self.paths = paths;
        self
    }

    /// Sets the cross-series correlation.
    #[must_use]
    pub fn with_correlation(mut self, correlation: f64) -> Self {
        self.correlation = correlation;
        self
    }

    /// Sets the mining operation.
    #[must_use]
    pub fn with_mining(mut self, mining: MiningEconomicsParameters) -> Self {
        self.mining = mining;
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the number of retained sample paths.
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Sets the histogram bin count.
    #[must_use]
    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    /// Invested capital as `f64`.
    pub fn capital_f64(&self) -> Result<f64> {
        decimal_to_f64("invested_capital", self.invested_capital)
    }

    /// Validates every parameter, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PATHS..=MAX_PATHS).contains(&self.paths) {
            return Err(SimulationError::invalid(
                "paths",
                self.paths,
                "a path count in [100, 10000]",
            ));
        }
        if !(1..=MAX_HORIZON_YEARS).contains(&self.horizon_years) {
            return Err(SimulationError::invalid(
                "horizon_years",
                self.horizon_years,
                "a horizon in [1, 100] years",
            ));
        }
        self.primary.validate(PRIMARY)?;
        self.secondary.validate(SECONDARY)?;
        if !(self.correlation > -1.0 && self.correlation < 1.0) {
            return Err(SimulationError::invalid(
                "correlation",
                self.correlation,
                "a coefficient in (-1, 1)",
            ));
        }
        if self.invested_capital <= Decimal::ZERO {
            return Err(SimulationError::invalid(
                "invested_capital",
                self.invested_capital,
                "an amount greater than 0",
            ));
        }
        self.capital_f64()?;
        if self.histogram_bins == 0 {
            return Err(SimulationError::invalid(
                "histogram_bins",
                self.histogram_bins,
                "at least 1 bin",
            ));
        }
        self.mining.validate()?;
        // The last simulated calendar year must be representable.
        if self
            .mining
            .start_year
            .checked_add(self.horizon_years - 1)
            .is_none()
        {
            return Err(SimulationError::invalid(
                "mining.start_year",
                self.mining.start_year,
                "a start year that keeps the horizon within u32",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config() -> SimulationConfig {
        SimulationConfig::new(
            5,
            AssetSeriesConfig::new("BTC", dec!(50000), dec!(150000), 0.6),
            AssetSeriesConfig::new("SPX", dec!(5000), dec!(6500), 0.18),
            dec!(100000),
        )
    }

    fn invalid_name(config: &SimulationConfig) -> &'static str {
        match config.validate() {
            Err(SimulationError::InvalidParameter { name, .. }) => name,
            other => panic!("expected invalid parameter, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_path_count_bounds() {
        assert_eq!(invalid_name(&config().with_paths(99)), "paths");
        assert_eq!(invalid_name(&config().with_paths(10_001)), "paths");
        assert!(config().with_paths(100).validate().is_ok());
        assert!(config().with_paths(10_000).validate().is_ok());
    }

    #[test]
    fn test_correlation_is_open_interval() {
        assert_eq!(invalid_name(&config().with_correlation(1.0)), "correlation");
        assert_eq!(invalid_name(&config().with_correlation(-1.0)), "correlation");
        assert_eq!(invalid_name(&config().with_correlation(f64::NAN)), "correlation");
        assert!(config().with_correlation(-0.99).validate().is_ok());
    }

    #[test]
    fn test_prices_must_be_positive() {
        let mut cfg = config();
        cfg.primary.start_price = Decimal::ZERO;
        assert_eq!(invalid_name(&cfg), "primary.start_price");

        let mut cfg = config();
        cfg.secondary.target_price = dec!(-1);
        assert_eq!(invalid_name(&cfg), "secondary.target_price");
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let mut cfg = config();
        cfg.horizon_years = 0;
        assert_eq!(invalid_name(&cfg), "horizon_years");
    }

    #[test]
    fn test_horizon_capped() {
        let mut cfg = config();
        cfg.horizon_years = MAX_HORIZON_YEARS;
        assert!(cfg.validate().is_ok());
        cfg.horizon_years = MAX_HORIZON_YEARS + 1;
        assert_eq!(invalid_name(&cfg), "horizon_years");
        cfg.horizon_years = u32::MAX;
        assert_eq!(invalid_name(&cfg), "horizon_years");
    }

    #[test]
    fn test_start_year_must_fit_horizon() {
        let mining = MiningEconomicsParameters::new(
            1000.0,
            700_000_000.0,
            dec!(100000),
            dec!(1000),
        );
        let cfg = config()
            .with_paths(100)
            .with_mining(mining.clone().with_start_year(u32::MAX));
        assert_eq!(invalid_name(&cfg), "mining.start_year");

        // A one-year horizon ends in the start year itself.
        let mut cfg = config().with_mining(mining.with_start_year(u32::MAX));
        cfg.horizon_years = 1;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_negative_volatility_rejected() {
        let mut cfg = config();
        cfg.primary.volatility = -0.1;
        assert_eq!(invalid_name(&cfg), "primary.volatility");
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let json = r#"{
            "paths": 500,
            "horizon_years": 4,
            "primary": {
                "name": "BTC", "start_price": "60000", "target_price": "120000", "volatility": 0.55
            },
            "secondary": {
                "name": "SPX", "start_price": "5000", "target_price": "6000", "volatility": 0.2
            },
            "correlation": 0.3,
            "invested_capital": "250000"
        }"#;
        let cfg: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.sample_size, DEFAULT_SAMPLE_SIZE);
        assert_eq!(cfg.histogram_bins, DEFAULT_HISTOGRAM_BINS);
        assert!(!cfg.mining.is_configured());
        assert!(cfg.validate().is_ok());
    }
}
