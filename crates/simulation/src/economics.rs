//! Bitcoin production of a hashrate mining operation.
//!
//! Output does not depend on the simulated price, so it is computed once per
//! run and valued against each path's terminal price by the evaluator.

use minesim_domain::error::{Result, SimulationError};
use minesim_domain::mining::MiningEconomicsParameters;
use serde::Serialize;

/// Mining output of one horizon year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyProduction {
    /// 1-indexed year within the horizon.
    pub year: u32,
    pub calendar_year: u32,
    pub difficulty_factor: f64,
    pub network_share: f64,
    pub block_reward: f64,
    pub btc_mined: f64,
}

/// Difficulty multiplier in horizon year `year`: `(1 + growth)^(year - 1)`.
pub fn difficulty_factor(growth: f64, year: u32) -> Result<f64> {
    if year < 1 {
        return Err(SimulationError::invalid("year", year, "a 1-indexed horizon year"));
    }
    let exponent = i32::try_from(year - 1)
        .map_err(|_| SimulationError::invalid("year", year, "a horizon year within i32"))?;
    Ok((1.0 + growth).powi(exponent))
}

/// Fraction of network hashrate attributable to the operation in `year`.
///
/// Difficulty growth is applied as a dilution of the owned hashrate against a
/// fixed network hashrate.
pub fn network_share(params: &MiningEconomicsParameters, year: u32) -> Result<f64> {
    let factor = difficulty_factor(params.difficulty_growth, year)?;
    if !(factor.is_finite() && factor > 0.0) {
        return Err(SimulationError::DegenerateDistribution(format!(
            "difficulty factor {factor} in year {year}"
        )));
    }
    if !(params.network_hashrate.is_finite() && params.network_hashrate > 0.0) {
        return Err(SimulationError::DegenerateDistribution(format!(
            "network hashrate {}",
            params.network_hashrate
        )));
    }
    Ok((params.owned_hashrate / factor) / params.network_hashrate)
}

/// Production breakdown for `year`.
pub fn production_in_year(
    params: &MiningEconomicsParameters,
    year: u32,
) -> Result<YearlyProduction> {
    let share = network_share(params, year)?;
    let calendar_year = params.start_year.checked_add(year - 1).ok_or_else(|| {
        SimulationError::invalid(
            "start_year",
            params.start_year,
            "a start year that keeps the horizon within u32",
        )
    })?;
    let block_reward = params.halving.block_reward(calendar_year);
    Ok(YearlyProduction {
        year,
        calendar_year,
        difficulty_factor: difficulty_factor(params.difficulty_growth, year)?,
        network_share: share,
        block_reward,
        btc_mined: share * params.halving.blocks_per_year * block_reward * params.uptime,
    })
}

/// Per-year production over `1..=horizon_years`.
pub fn yearly_production(
    params: &MiningEconomicsParameters,
    horizon_years: u32,
) -> Result<Vec<YearlyProduction>> {
    (1..=horizon_years)
        .map(|year| production_in_year(params, year))
        .collect()
}

/// Total BTC mined by the whole operation over the horizon.
pub fn total_btc_mined(params: &MiningEconomicsParameters, horizon_years: u32) -> Result<f64> {
    Ok(yearly_production(params, horizon_years)?
        .iter()
        .map(|y| y.btc_mined)
        .sum())
}

/// BTC allocated to the investor under the profit-share split.
pub fn investor_btc(params: &MiningEconomicsParameters, horizon_years: u32) -> Result<f64> {
    Ok(total_btc_mined(params, horizon_years)? * params.profit_share)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> MiningEconomicsParameters {
        // 10 PH/s against a 700 EH/s network.
        MiningEconomicsParameters::new(10_000.0, 700_000_000.0, dec!(200000), dec!(40000))
            .with_start_year(2025)
    }

    #[test]
    fn test_first_year_has_no_difficulty_dilution() {
        let p = params().with_difficulty_growth(0.4);
        let share = network_share(&p, 1).unwrap();
        assert!((share - 10_000.0 / 700_000_000.0).abs() < 1e-18);
    }

    #[test]
    fn test_yearly_btc_formula() {
        let p = params().with_uptime(0.95);
        let year = production_in_year(&p, 1).unwrap();
        let expected = (10_000.0 / 700_000_000.0) * 52_560.0 * 3.125 * 0.95;
        assert!((year.btc_mined - expected).abs() < 1e-12);
        assert_eq!(year.calendar_year, 2025);
    }

    #[test]
    fn test_halving_reduces_output() {
        let rows = yearly_production(&params(), 5).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2].calendar_year, 2027);
        assert_eq!(rows[3].block_reward, rows[2].block_reward / 2.0);
        assert!((rows[3].btc_mined - rows[2].btc_mined / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_network_share_decreases_with_difficulty_growth() {
        let mut previous = f64::INFINITY;
        for growth in [0.0, 0.1, 0.25, 0.5, 1.0, 2.0] {
            let share = network_share(&params().with_difficulty_growth(growth), 3).unwrap();
            assert!(share < previous, "growth {growth}: {share} >= {previous}");
            previous = share;
        }
    }

    #[test]
    fn test_zero_network_hashrate_is_degenerate() {
        let mut p = params();
        p.network_hashrate = 0.0;
        assert!(matches!(
            network_share(&p, 1),
            Err(SimulationError::DegenerateDistribution(_))
        ));
    }

    #[test]
    fn test_investor_share_scales_total() {
        let p = params().with_profit_share(0.6);
        let total = total_btc_mined(&p, 4).unwrap();
        let investor = investor_btc(&p, 4).unwrap();
        assert!((investor - total * 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_year_zero_rejected() {
        assert!(difficulty_factor(0.1, 0).is_err());
    }

    #[test]
    fn test_calendar_year_overflow_is_an_error() {
        let p = params().with_start_year(u32::MAX);
        assert_eq!(production_in_year(&p, 1).unwrap().calendar_year, u32::MAX);
        assert!(matches!(
            yearly_production(&p, 3),
            Err(SimulationError::InvalidParameter {
                name: "start_year",
                ..
            })
        ));
    }

    #[test]
    fn test_year_beyond_i32_rejected() {
        assert!(difficulty_factor(0.0, u32::MAX).is_err());
    }
}
