//! Ensemble statistics over per-path outcomes.
//!
//! Everything here runs once, after all paths have been evaluated.

use minesim_domain::error::{Result, SimulationError};
use minesim_domain::value_objects::statistics::{
    AggregateStatistics, Histogram, Percentiles, StrategyStatistics, TerminalPriceSummary,
};

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

fn non_empty(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        Err(SimulationError::EmptySample)
    } else {
        Ok(())
    }
}

fn same_length(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(SimulationError::invalid(
            "outcomes",
            format!("{} vs {}", a.len(), b.len()),
            "sequences of equal length",
        ));
    }
    non_empty(a)
}

/// Percentile of an ascending slice, interpolating linearly between the
/// order statistics around rank `p / 100 * (n - 1)`.
fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Linear-interpolated percentile `p` (0–100) of `values`.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    non_empty(values)?;
    Ok(percentile_of_sorted(&sorted(values), p))
}

fn percentiles_of_sorted(sorted: &[f64]) -> Percentiles {
    Percentiles {
        p10: percentile_of_sorted(sorted, 10.0),
        p25: percentile_of_sorted(sorted, 25.0),
        p50: percentile_of_sorted(sorted, 50.0),
        p75: percentile_of_sorted(sorted, 75.0),
        p90: percentile_of_sorted(sorted, 90.0),
    }
}

pub fn mean(values: &[f64]) -> Result<f64> {
    non_empty(values)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with divisor `n`.
pub fn population_std_dev(values: &[f64]) -> Result<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

pub fn min(values: &[f64]) -> Result<f64> {
    non_empty(values)?;
    Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn max(values: &[f64]) -> Result<f64> {
    non_empty(values)?;
    Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Fraction of index-aligned pairs where `a` strictly beats `b`.
pub fn win_rate(a: &[f64], b: &[f64]) -> Result<f64> {
    same_length(a, b)?;
    let wins = a.iter().zip(b).filter(|(x, y)| x > y).count();
    Ok(wins as f64 / a.len() as f64)
}

/// Fraction of strictly negative values.
pub fn downside_probability(values: &[f64]) -> Result<f64> {
    non_empty(values)?;
    let losses = values.iter().filter(|v| **v < 0.0).count();
    Ok(losses as f64 / values.len() as f64)
}

fn expected_shortfall_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let cutoff = percentile_of_sorted(sorted, p);
    let tail: Vec<f64> = sorted.iter().copied().take_while(|v| *v <= cutoff).collect();
    if tail.is_empty() {
        return sorted[0];
    }
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// Mean of the values at or below the `p`-th percentile.
pub fn expected_shortfall(values: &[f64], p: f64) -> Result<f64> {
    non_empty(values)?;
    Ok(expected_shortfall_of_sorted(&sorted(values), p))
}

/// Counts `values` into `bins` equal-width bins spanning `[min, max]`.
///
/// Bins are right-open except the last, which includes `max`. When every
/// value is identical all of them land in the first bin.
pub fn histogram(values: &[f64], bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(SimulationError::invalid("bins", bins, "at least 1 bin"));
    }
    let lo = min(values)?;
    let hi = max(values)?;
    let width = (hi - lo) / bins as f64;

    let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in values {
        let index = if width > 0.0 {
            (((v - lo) / width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        counts[index] += 1;
    }

    Ok(Histogram { edges, counts })
}

/// Pearson correlation of two equal-length samples.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> Result<f64> {
    same_length(a, b)?;
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a <= 0.0 || var_b <= 0.0 {
        return Err(SimulationError::DegenerateDistribution(
            "correlation of a constant sample".to_string(),
        ));
    }
    Ok(cov / (var_a.sqrt() * var_b.sqrt()))
}

/// Distribution summary of one strategy's ROI values.
pub fn summarize_strategy(values: &[f64], bins: usize) -> Result<StrategyStatistics> {
    non_empty(values)?;
    let sorted = sorted(values);
    Ok(StrategyStatistics {
        percentiles: percentiles_of_sorted(&sorted),
        mean: mean(values)?,
        std_dev: population_std_dev(values)?,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        downside_probability: downside_probability(values)?,
        expected_shortfall_10: expected_shortfall_of_sorted(&sorted, 10.0),
        histogram: histogram(values, bins)?,
    })
}

/// Builds the ensemble statistics from the two ROI sequences.
pub fn aggregate(buy_roi: &[f64], mine_roi: &[f64], bins: usize) -> Result<AggregateStatistics> {
    same_length(buy_roi, mine_roi)?;
    let advantage: Vec<f64> = mine_roi.iter().zip(buy_roi).map(|(m, b)| m - b).collect();

    Ok(AggregateStatistics {
        paths: buy_roi.len(),
        buy: summarize_strategy(buy_roi, bins)?,
        mine: summarize_strategy(mine_roi, bins)?,
        mine_win_rate: win_rate(mine_roi, buy_roi)?,
        buy_win_rate: win_rate(buy_roi, mine_roi)?,
        mean_mining_advantage: mean(&advantage)?,
    })
}

/// Percentiles and mean of a series' simulated terminal prices.
pub fn terminal_summary(series: &str, terminal_prices: &[f64]) -> Result<TerminalPriceSummary> {
    non_empty(terminal_prices)?;
    Ok(TerminalPriceSummary {
        series: series.to_string(),
        percentiles: percentiles_of_sorted(&sorted(terminal_prices)),
        mean: mean(terminal_prices)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_of_five() {
        let values = [12.0, -3.0, 40.0, 7.0, 19.0];
        assert_eq!(percentile(&values, 50.0).unwrap(), 12.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        // rank = 0.25 * 3 = 0.75
        assert!((percentile(&values, 25.0).unwrap() - 1.75).abs() < 1e-12);
        assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&values, 100.0).unwrap(), 4.0);
    }

    #[test]
    fn test_moments() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values).unwrap(), 5.0);
        assert_eq!(population_std_dev(&values).unwrap(), 2.0);
        assert_eq!(min(&values).unwrap(), 2.0);
        assert_eq!(max(&values).unwrap(), 9.0);
    }

    #[test]
    fn test_win_rate_ignores_ties() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [0.0, 2.0, 5.0, 3.0];
        assert_eq!(win_rate(&a, &b).unwrap(), 0.5);
        assert_eq!(win_rate(&b, &a).unwrap(), 0.25);
    }

    #[test]
    fn test_win_rate_length_mismatch() {
        assert!(win_rate(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_downside_probability_is_strict() {
        let values = [-1.0, 0.0, 2.0, -0.5];
        assert_eq!(downside_probability(&values).unwrap(), 0.5);
    }

    #[test]
    fn test_histogram_counts_sum_and_closed_last_bin() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let hist = histogram(&values, 5).unwrap();
        assert_eq!(hist.edges.len(), 6);
        assert_eq!(hist.total(), values.len());
        // [0,2) [2,4) [4,6) [6,8) [8,10]
        assert_eq!(hist.counts, vec![2, 2, 2, 2, 3]);
    }

    #[test]
    fn test_histogram_constant_sample() {
        let hist = histogram(&[3.0; 7], 30).unwrap();
        assert_eq!(hist.counts[0], 7);
        assert_eq!(hist.total(), 7);
    }

    #[test]
    fn test_expected_shortfall() {
        let values: Vec<f64> = (1..=11).map(f64::from).collect();
        // p10 at rank 1.0 -> 2.0; tail = {1, 2}
        assert_eq!(expected_shortfall(&values, 10.0).unwrap(), 1.5);
    }

    #[test]
    fn test_empty_sample_errors() {
        assert_eq!(mean(&[]), Err(SimulationError::EmptySample));
        assert!(percentile(&[], 50.0).is_err());
        assert!(histogram(&[], 10).is_err());
    }

    #[test]
    fn test_pearson_correlation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson_correlation(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(&a, &c).unwrap() + 1.0).abs() < 1e-12);
        assert!(pearson_correlation(&a, &[1.0; 4]).is_err());
    }

    #[test]
    fn test_aggregate() {
        let buy = [10.0, -5.0, 30.0, 0.0];
        let mine = [12.0, -5.0, 20.0, 1.0];
        let stats = aggregate(&buy, &mine, 4).unwrap();
        assert_eq!(stats.paths, 4);
        assert_eq!(stats.mine_win_rate, 0.5);
        assert_eq!(stats.buy_win_rate, 0.25);
        assert_eq!(stats.buy.downside_probability, 0.25);
        // mine - buy = [2, 0, -10, 1]
        assert!((stats.mean_mining_advantage + 1.75).abs() < 1e-12);
        assert_eq!(stats.mine.histogram.total(), 4);
    }
}
