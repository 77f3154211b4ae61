use serde::{Deserialize, Serialize};

/// Yearly price observations for one simulated path.
///
/// Index 0 is the configured start price; index `t` is the price after `t` years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePath {
    pub prices: Vec<f64>,
}

impl PricePath {
    pub fn new(prices: Vec<f64>) -> Self {
        Self { prices }
    }

    /// First price, or 0.0 for an empty path.
    pub fn start(&self) -> f64 {
        self.prices.first().copied().unwrap_or(0.0)
    }

    pub fn terminal(&self) -> f64 {
        self.prices.last().copied().unwrap_or(0.0)
    }

    /// Number of yearly steps (length minus one).
    pub fn horizon(&self) -> usize {
        self.prices.len().saturating_sub(1)
    }
}
