use serde::{Deserialize, Serialize};

/// Returns of both strategies on a single path, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathOutcome {
    pub buy_roi_pct: f64,
    pub mine_roi_pct: f64,
}

impl PathOutcome {
    pub fn new(buy_roi_pct: f64, mine_roi_pct: f64) -> Self {
        Self {
            buy_roi_pct,
            mine_roi_pct,
        }
    }

    /// Mining return minus holding return, in percentage points.
    pub fn mining_advantage(&self) -> f64 {
        self.mine_roi_pct - self.buy_roi_pct
    }
}
