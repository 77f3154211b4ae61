use super::path_outcome::PathOutcome;
use super::price_path::PricePath;
use super::statistics::{AggregateStatistics, TerminalPriceSummary};
use serde::{Deserialize, Serialize};

/// One of the leading paths of a run, kept for illustration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePath {
    pub index: usize,
    pub primary: PricePath,
    pub secondary: PricePath,
    pub outcome: PathOutcome,
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Seed the run was generated from.
    pub seed: u64,
    /// Calibrated drift of the primary series.
    pub primary_drift: f64,
    /// Calibrated drift of the secondary series.
    pub secondary_drift: f64,
    /// Measured correlation between the two shock matrices.
    pub realized_correlation: Option<f64>,
    /// Holding-strategy ROI per path, in path order.
    pub buy_roi: Vec<f64>,
    /// Mining-strategy ROI per path, in path order.
    pub mine_roi: Vec<f64>,
    pub samples: Vec<SamplePath>,
    pub primary_terminal: TerminalPriceSummary,
    pub secondary_terminal: TerminalPriceSummary,
    pub statistics: AggregateStatistics,
}

impl SimulationReport {
    /// Outcome of path `index`, if it exists.
    pub fn outcome(&self, index: usize) -> Option<PathOutcome> {
        let buy = *self.buy_roi.get(index)?;
        let mine = *self.mine_roi.get(index)?;
        Some(PathOutcome::new(buy, mine))
    }
}
