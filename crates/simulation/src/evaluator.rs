//! Per-path valuation of the holding and mining strategies.

use crate::economics::investor_btc;
use minesim_domain::error::Result;
use minesim_domain::mining::MiningEconomicsParameters;
use minesim_domain::value_objects::path_outcome::PathOutcome;
use minesim_domain::value_objects::price_path::PricePath;
use tracing::warn;

/// Price-independent terms of the mining strategy for one investor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningPosition {
    /// BTC allocated to the investor over the horizon.
    pub investor_btc: f64,
    /// Investor's share of the equipment's residual value.
    pub residual_value: f64,
    /// Investor's share of OPEX accrued over the horizon.
    pub opex_share: f64,
}

impl MiningPosition {
    /// Builds the investor's position. The investor's stake is
    /// `capital / total_capex`, capped at the whole operation.
    pub fn new(
        params: &MiningEconomicsParameters,
        capital: f64,
        horizon_years: u32,
    ) -> Result<Self> {
        let capex = params.total_capex_f64()?;
        let opex = params.annual_opex_f64()?;
        let stake = (capital / capex).min(1.0);
        Ok(Self {
            investor_btc: investor_btc(params, horizon_years)?,
            residual_value: stake * capex * params.residual_value,
            opex_share: stake * opex * f64::from(horizon_years),
        })
    }

    /// Investor's end-of-horizon value at `btc_price`.
    #[must_use]
    pub fn terminal_value(&self, btc_price: f64) -> f64 {
        self.investor_btc * btc_price + self.residual_value - self.opex_share
    }
}

/// Values both strategies against a single price path.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyEvaluator {
    capital: f64,
    mining: Option<MiningPosition>,
}

impl StrategyEvaluator {
    /// Creates an evaluator. When the mining inputs are unconfigured or
    /// degenerate the mining strategy is reported at 0% on every path.
    pub fn new(capital: f64, params: &MiningEconomicsParameters, horizon_years: u32) -> Self {
        let mining = match position(params, capital, horizon_years) {
            Ok(Some(position)) => Some(position),
            Ok(None) => {
                warn!("Mining operation not configured, mining return set to 0%");
                None
            }
            Err(e) => {
                warn!(error = %e, "Mining economics degenerate, mining return set to 0%");
                None
            }
        };
        Self { capital, mining }
    }

    /// Same as [`Self::new`] without the warnings.
    fn quiet(capital: f64, params: &MiningEconomicsParameters, horizon_years: u32) -> Self {
        let mining = position(params, capital, horizon_years).ok().flatten();
        Self { capital, mining }
    }

    pub fn mining_position(&self) -> Option<&MiningPosition> {
        self.mining.as_ref()
    }

    /// Holding return: buy at `path[0]`, sell at the terminal price.
    #[must_use]
    pub fn buy_roi(&self, path: &PricePath) -> f64 {
        debug_assert!(!path.prices.is_empty(), "price path has no prices");
        let units = self.capital / path.start();
        let final_value = units * path.terminal();
        (final_value - self.capital) / self.capital * 100.0
    }

    /// Mining return valued at the same terminal price as [`Self::buy_roi`].
    #[must_use]
    pub fn mine_roi(&self, path: &PricePath) -> f64 {
        debug_assert!(!path.prices.is_empty(), "price path has no prices");
        match &self.mining {
            Some(position) => {
                (position.terminal_value(path.terminal()) - self.capital) / self.capital * 100.0
            }
            None => 0.0,
        }
    }

    #[must_use]
    pub fn evaluate(&self, path: &PricePath) -> PathOutcome {
        PathOutcome::new(self.buy_roi(path), self.mine_roi(path))
    }
}

/// `None` when the operation is unconfigured.
fn position(
    params: &MiningEconomicsParameters,
    capital: f64,
    horizon_years: u32,
) -> Result<Option<MiningPosition>> {
    if !params.is_configured() {
        return Ok(None);
    }
    MiningPosition::new(params, capital, horizon_years).map(Some)
}

/// Evaluates a single path.
///
/// This rebuilds the mining position on every call and logs nothing, so an
/// unconfigured or degenerate operation silently yields the 0% sentinel.
/// Callers valuing many paths should build one [`StrategyEvaluator`] and
/// reuse it.
pub fn evaluate_path(
    path: &PricePath,
    params: &MiningEconomicsParameters,
    capital: f64,
) -> PathOutcome {
    let horizon = u32::try_from(path.horizon()).unwrap_or(u32::MAX);
    StrategyEvaluator::quiet(capital, params, horizon).evaluate(path)
}
