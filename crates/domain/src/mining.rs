//! Mining operation economics parameters.

use crate::error::{Result, SimulationError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Block subsidy schedule used to value mined output per calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalvingSchedule {
    /// Block reward in BTC before the next halving.
    pub initial_block_reward: f64,
    /// First calendar year in which the reduced reward applies.
    pub next_halving_year: u32,
    /// Years between subsequent halvings.
    pub interval_years: u32,
    /// Expected blocks found by the network per year.
    pub blocks_per_year: f64,
}

impl Default for HalvingSchedule {
    fn default() -> Self {
        Self {
            initial_block_reward: 3.125,
            next_halving_year: 2028,
            interval_years: 4,
            blocks_per_year: 52_560.0, // 144 blocks/day
        }
    }
}

impl HalvingSchedule {
    /// Returns the block reward in effect during `calendar_year`.
    #[must_use]
    pub fn block_reward(&self, calendar_year: u32) -> f64 {
        if calendar_year < self.next_halving_year {
            return self.initial_block_reward;
        }
        let halvings = 1 + (calendar_year - self.next_halving_year) / self.interval_years.max(1);
        let halvings = i32::try_from(halvings).unwrap_or(i32::MAX);
        self.initial_block_reward / 2f64.powi(halvings)
    }

    fn validate(&self) -> Result<()> {
        if !(self.initial_block_reward.is_finite() && self.initial_block_reward > 0.0) {
            return Err(SimulationError::invalid(
                "halving.initial_block_reward",
                self.initial_block_reward,
                "a positive finite number",
            ));
        }
        if self.interval_years == 0 {
            return Err(SimulationError::invalid(
                "halving.interval_years",
                self.interval_years,
                "at least 1 year",
            ));
        }
        if !(self.blocks_per_year.is_finite() && self.blocks_per_year > 0.0) {
            return Err(SimulationError::invalid(
                "halving.blocks_per_year",
                self.blocks_per_year,
                "a positive finite number",
            ));
        }
        Ok(())
    }
}

/// Inputs of the hashrate mining model.
///
/// Hashrates only need to share a unit (TH/s is the usual choice). Monetary
/// amounts are in the same currency as the asset prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningEconomicsParameters {
    /// Total hashrate owned by the operation.
    pub owned_hashrate: f64,
    /// Assumed total network hashrate at the start of the horizon.
    pub network_hashrate: f64,
    /// Annual difficulty growth rate (0.3 = +30% per year).
    pub difficulty_growth: f64,
    /// Fraction of the year the fleet is hashing.
    pub uptime: f64,
    /// Total capital expenditure of the operation.
    pub total_capex: Decimal,
    /// Total operating expenditure per year.
    pub annual_opex: Decimal,
    /// Investor's share of mined output.
    pub profit_share: f64,
    /// Fraction of CAPEX recovered from the equipment at the end of the horizon.
    pub residual_value: f64,
    /// Calendar year of the first simulated year.
    pub start_year: u32,
    /// Block subsidy schedule.
    #[serde(default)]
    pub halving: HalvingSchedule,
}

impl Default for MiningEconomicsParameters {
    /// An unconfigured operation: no hashrate, no CAPEX.
    fn default() -> Self {
        Self {
            owned_hashrate: 0.0,
            network_hashrate: 0.0,
            difficulty_growth: 0.0,
            uptime: 0.0,
            total_capex: Decimal::ZERO,
            annual_opex: Decimal::ZERO,
            profit_share: 0.0,
            residual_value: 0.0,
            start_year: 2025,
            halving: HalvingSchedule::default(),
        }
    }
}

impl MiningEconomicsParameters {
    /// Creates a configured operation with full uptime, full profit share,
    /// flat difficulty and no residual value.
    #[must_use]
    pub fn new(
        owned_hashrate: f64,
        network_hashrate: f64,
        total_capex: Decimal,
        annual_opex: Decimal,
    ) -> Self {
        Self {
            owned_hashrate,
            network_hashrate,
            uptime: 1.0,
            total_capex,
            annual_opex,
            profit_share: 1.0,
            ..Self::default()
        }
    }

    /// Sets the annual difficulty growth rate.
    #[must_use]
    pub fn with_difficulty_growth(mut self, growth: f64) -> Self {
        self.difficulty_growth = growth;
        self
    }

    /// Sets the uptime fraction.
    #[must_use]
    pub fn with_uptime(mut self, uptime: f64) -> Self {
        self.uptime = uptime;
        self
    }

    /// Sets the investor's profit-share fraction.
    #[must_use]
    pub fn with_profit_share(mut self, share: f64) -> Self {
        self.profit_share = share;
        self
    }

    /// Sets the equipment residual-value fraction.
    #[must_use]
    pub fn with_residual_value(mut self, residual: f64) -> Self {
        self.residual_value = residual;
        self
    }

    /// Sets the first calendar year.
    #[must_use]
    pub fn with_start_year(mut self, year: u32) -> Self {
        self.start_year = year;
        self
    }

    /// Sets the halving schedule.
    #[must_use]
    pub fn with_halving(mut self, halving: HalvingSchedule) -> Self {
        self.halving = halving;
        self
    }

    /// Whether enough of the operation is described to value it.
    ///
    /// An unconfigured block is valid input; the mining strategy then
    /// reports a 0% return.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.owned_hashrate > 0.0 && self.network_hashrate > 0.0 && self.total_capex > Decimal::ZERO
    }

    /// Total CAPEX as `f64`.
    pub fn total_capex_f64(&self) -> Result<f64> {
        decimal_to_f64("mining.total_capex", self.total_capex)
    }

    /// Annual OPEX as `f64`.
    pub fn annual_opex_f64(&self) -> Result<f64> {
        decimal_to_f64("mining.annual_opex", self.annual_opex)
    }

    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        non_negative("mining.owned_hashrate", self.owned_hashrate)?;
        non_negative("mining.network_hashrate", self.network_hashrate)?;
        non_negative("mining.difficulty_growth", self.difficulty_growth)?;
        unit_interval("mining.profit_share", self.profit_share)?;
        unit_interval("mining.residual_value", self.residual_value)?;

        let uptime_ok = if self.is_configured() {
            self.uptime > 0.0 && self.uptime <= 1.0
        } else {
            (0.0..=1.0).contains(&self.uptime)
        };
        if !uptime_ok {
            return Err(SimulationError::invalid(
                "mining.uptime",
                self.uptime,
                "a fraction in (0, 1]",
            ));
        }

        if self.total_capex < Decimal::ZERO {
            return Err(SimulationError::invalid(
                "mining.total_capex",
                self.total_capex,
                "a non-negative amount",
            ));
        }
        if self.annual_opex < Decimal::ZERO {
            return Err(SimulationError::invalid(
                "mining.annual_opex",
                self.annual_opex,
                "a non-negative amount",
            ));
        }
        self.halving.validate()
    }
}

/// Converts a monetary amount for use in floating point math.
pub fn decimal_to_f64(name: &'static str, value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SimulationError::invalid(name, value, "an amount representable as f64"))
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid(name, value, "a non-negative finite number"))
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::invalid(name, value, "a fraction in [0, 1]"))
    }
}
