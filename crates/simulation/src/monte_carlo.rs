//! Monte Carlo runner comparing the holding and mining strategies.
//!
//! A run validates its config, calibrates both series, draws every shock up
//! front and then evaluates paths in batches on the rayon pool. The
//! cancellation token is checked between batches. Statistics are computed
//! once all batches have finished.

use crate::calibration::CalibratedSeries;
use crate::evaluator::StrategyEvaluator;
use crate::price_path::{GeometricBrownianMotion, PricePathGenerator};
use crate::random::{CorrelatedDraws, CorrelatedNormalGenerator};
use crate::statistics::{aggregate, pearson_correlation, terminal_summary};
use minesim_domain::config::SimulationConfig;
use minesim_domain::error::{Result, SimulationError};
use minesim_domain::value_objects::path_outcome::PathOutcome;
use minesim_domain::value_objects::price_path::PricePath;
use minesim_domain::value_objects::simulation_report::{SamplePath, SimulationReport};
use rand::Rng;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Paths evaluated between two cancellation checks.
pub const BATCH_SIZE: usize = 256;

/// Shared flag used to stop a run between batches.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Result of evaluating one path.
struct PathRecord {
    outcome: PathOutcome,
    primary_terminal: f64,
    secondary_terminal: f64,
    sample: Option<(PricePath, PricePath)>,
}

pub struct MonteCarloRunner {
    config: SimulationConfig,
}

impl MonteCarloRunner {
    /// Validates `config` and creates a runner for it.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(&self) -> Result<SimulationReport> {
        self.run_with_cancellation(&CancellationToken::new())
    }

    pub fn run_with_cancellation(&self, token: &CancellationToken) -> Result<SimulationReport> {
        let config = &self.config;
        let started = Instant::now();
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let horizon = config.horizon_years;
        let steps = horizon as usize;

        let primary = CalibratedSeries::calibrate(&config.primary, horizon)?;
        let secondary = CalibratedSeries::calibrate(&config.secondary, horizon)?;
        info!(
            paths = config.paths,
            horizon,
            seed,
            primary_drift = primary.drift,
            secondary_drift = secondary.drift,
            "Starting Monte Carlo run"
        );

        let generator = CorrelatedNormalGenerator::new(config.correlation)?;
        let draws = generator.generate_seeded(seed, config.paths, steps);

        let evaluator = StrategyEvaluator::new(config.capital_f64()?, &config.mining, horizon);
        let primary_gbm = GeometricBrownianMotion::yearly(&primary);
        let secondary_gbm = GeometricBrownianMotion::yearly(&secondary);

        let mut records: Vec<PathRecord> = Vec::with_capacity(config.paths);
        for batch_start in (0..config.paths).step_by(BATCH_SIZE) {
            if token.is_cancelled() {
                info!(completed = records.len(), "Monte Carlo run cancelled");
                return Err(SimulationError::Cancelled);
            }
            let batch_end = (batch_start + BATCH_SIZE).min(config.paths);
            let batch: Vec<PathRecord> = (batch_start..batch_end)
                .into_par_iter()
                .map(|index| {
                    self.simulate_path(index, &draws, &primary_gbm, &secondary_gbm, &evaluator)
                })
                .collect();
            debug!(batch_start, batch_end, "Batch complete");
            records.extend(batch);
        }

        let report = self.build_report(seed, &primary, &secondary, &draws, records)?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            buy_median = report.statistics.buy.percentiles.p50,
            mine_median = report.statistics.mine.percentiles.p50,
            mine_win_rate = report.statistics.mine_win_rate,
            "Monte Carlo run finished"
        );
        Ok(report)
    }

    fn simulate_path(
        &self,
        index: usize,
        draws: &CorrelatedDraws,
        primary_gbm: &GeometricBrownianMotion,
        secondary_gbm: &GeometricBrownianMotion,
        evaluator: &StrategyEvaluator,
    ) -> PathRecord {
        let primary = primary_gbm.generate(draws.z1.row(index));
        let secondary = secondary_gbm.generate(draws.z2.row(index));
        let outcome = evaluator.evaluate(&primary);

        let primary_terminal = primary.terminal();
        let secondary_terminal = secondary.terminal();
        let sample = (index < self.config.sample_size).then_some((primary, secondary));

        PathRecord {
            outcome,
            primary_terminal,
            secondary_terminal,
            sample,
        }
    }

    fn build_report(
        &self,
        seed: u64,
        primary: &CalibratedSeries,
        secondary: &CalibratedSeries,
        draws: &CorrelatedDraws,
        records: Vec<PathRecord>,
    ) -> Result<SimulationReport> {
        let mut buy_roi = Vec::with_capacity(records.len());
        let mut mine_roi = Vec::with_capacity(records.len());
        let mut primary_terminals = Vec::with_capacity(records.len());
        let mut secondary_terminals = Vec::with_capacity(records.len());
        let mut samples = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            buy_roi.push(record.outcome.buy_roi_pct);
            mine_roi.push(record.outcome.mine_roi_pct);
            primary_terminals.push(record.primary_terminal);
            secondary_terminals.push(record.secondary_terminal);
            if let Some((primary, secondary)) = record.sample {
                samples.push(SamplePath {
                    index,
                    primary,
                    secondary,
                    outcome: record.outcome,
                });
            }
        }

        let statistics = aggregate(&buy_roi, &mine_roi, self.config.histogram_bins)?;

        Ok(SimulationReport {
            seed,
            primary_drift: primary.drift,
            secondary_drift: secondary.drift,
            realized_correlation: pearson_correlation(draws.z1.as_slice(), draws.z2.as_slice())
                .ok(),
            buy_roi,
            mine_roi,
            samples,
            primary_terminal: terminal_summary(&primary.name, &primary_terminals)?,
            secondary_terminal: terminal_summary(&secondary.name, &secondary_terminals)?,
            statistics,
        })
    }
}

/// Runs a simulation for `config`.
pub fn run(config: SimulationConfig) -> Result<SimulationReport> {
    MonteCarloRunner::new(config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use minesim_domain::config::AssetSeriesConfig;
    use minesim_domain::mining::MiningEconomicsParameters;
    use rust_decimal_macros::dec;

    fn config() -> SimulationConfig {
        SimulationConfig::new(
            4,
            AssetSeriesConfig::new("BTC", dec!(60000), dec!(120000), 0.55),
            AssetSeriesConfig::new("SPX", dec!(5000), dec!(6000), 0.18),
            dec!(100000),
        )
        .with_paths(600)
        .with_correlation(0.4)
        .with_seed(99)
        .with_mining(
            MiningEconomicsParameters::new(15_000.0, 700_000_000.0, dec!(300000), dec!(45000))
                .with_profit_share(0.7)
                .with_residual_value(0.15)
                .with_difficulty_growth(0.25)
                .with_uptime(0.96),
        )
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let err = MonteCarloRunner::new(config().with_paths(50)).err().unwrap();
        assert!(matches!(err, SimulationError::InvalidParameter { name: "paths", .. }));
    }

    #[test]
    fn test_report_shapes() {
        let report = run(config()).unwrap();
        assert_eq!(report.seed, 99);
        assert_eq!(report.buy_roi.len(), 600);
        assert_eq!(report.mine_roi.len(), 600);
        assert_eq!(report.samples.len(), 10);
        assert_eq!(report.statistics.paths, 600);
        assert_eq!(report.statistics.buy.histogram.counts.len(), 30);
        assert_eq!(report.statistics.buy.histogram.total(), 600);
        assert_eq!(report.statistics.mine.histogram.total(), 600);
    }

    #[test]
    fn test_samples_match_outcomes() {
        let report = run(config()).unwrap();
        for sample in &report.samples {
            assert_eq!(report.outcome(sample.index), Some(sample.outcome));
            assert_eq!(sample.primary.prices[0], 60_000.0);
            assert_eq!(sample.secondary.prices[0], 5_000.0);
            assert_eq!(sample.primary.prices.len(), 5);
        }
    }

    #[test]
    fn test_same_seed_same_report() {
        assert_eq!(run(config()).unwrap(), run(config()).unwrap());
    }

    #[test]
    fn test_cancelled_token_stops_run() {
        let runner = MonteCarloRunner::new(config()).unwrap();
        let token = CancellationToken::new();
        token.clone().cancel();
        assert_eq!(
            runner.run_with_cancellation(&token),
            Err(SimulationError::Cancelled)
        );
    }

    #[test]
    fn test_win_rates_do_not_exceed_one() {
        let stats = run(config()).unwrap().statistics;
        assert!(stats.mine_win_rate + stats.buy_win_rate <= 1.0 + 1e-12);
    }
}
