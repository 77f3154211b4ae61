use serde::{Deserialize, Serialize};

/// Equal-width histogram over a strategy's outcome range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin edges, `counts.len() + 1` entries.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Linear-interpolated percentiles of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Distribution summary for one strategy's ROI values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStatistics {
    pub percentiles: Percentiles,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Fraction of paths with a strictly negative return.
    pub downside_probability: f64,
    /// Mean return of the paths at or below the 10th percentile.
    pub expected_shortfall_10: f64,
    pub histogram: Histogram,
}

/// Summary of simulated terminal prices for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalPriceSummary {
    pub series: String,
    pub percentiles: Percentiles,
    pub mean: f64,
}

/// Ensemble-wide statistics, built once after all paths complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    pub paths: usize,
    pub buy: StrategyStatistics,
    pub mine: StrategyStatistics,
    /// Fraction of paths where mining strictly beats holding.
    pub mine_win_rate: f64,
    /// Fraction of paths where holding strictly beats mining.
    pub buy_win_rate: f64,
    /// Mean of per-path `mine - buy` ROI, in percentage points.
    pub mean_mining_advantage: f64,
}
