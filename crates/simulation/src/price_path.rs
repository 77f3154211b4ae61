use crate::calibration::CalibratedSeries;
use crate::random::NormalMatrix;
use minesim_domain::value_objects::price_path::PricePath;
use rayon::prelude::*;

/// Turns one path's standard-normal shocks into a price path.
pub trait PricePathGenerator {
    fn generate(&self, shocks: &[f64]) -> PricePath;
}

pub struct GeometricBrownianMotion {
    pub initial_price: f64,
    pub drift: f64,      // annualized drift (mu)
    pub volatility: f64, // annualized volatility (sigma)
    pub time_step: f64,  // time step in years (dt), 1.0 for yearly steps
}

impl GeometricBrownianMotion {
    pub fn new(initial_price: f64, drift: f64, volatility: f64, time_step: f64) -> Self {
        Self {
            initial_price,
            drift,
            volatility,
            time_step,
        }
    }

    /// Yearly-step process for a calibrated series.
    pub fn yearly(series: &CalibratedSeries) -> Self {
        Self::new(series.start, series.drift, series.volatility, 1.0)
    }
}

impl PricePathGenerator for GeometricBrownianMotion {
    fn generate(&self, shocks: &[f64]) -> PricePath {
        let mut prices = Vec::with_capacity(shocks.len() + 1);
        prices.push(self.initial_price);

        let dt = self.time_step;
        let drift_term = (self.drift - 0.5 * self.volatility.powi(2)) * dt;
        let vol_term = self.volatility * dt.sqrt();

        let mut current_price = self.initial_price;
        for z in shocks {
            current_price *= (drift_term + vol_term * z).exp();
            prices.push(current_price);
        }

        PricePath::new(prices)
    }
}

/// Fixed path that ignores its shocks, for valuing known scenarios.
pub struct DeterministicPricePath {
    pub prices: Vec<f64>,
}

impl DeterministicPricePath {
    pub fn new(prices: Vec<f64>) -> Self {
        Self { prices }
    }
}

impl PricePathGenerator for DeterministicPricePath {
    fn generate(&self, _shocks: &[f64]) -> PricePath {
        PricePath::new(self.prices.clone())
    }
}

/// Generates one path per row of `shocks`, in row order.
pub fn simulate_ensemble<G>(generator: &G, shocks: &NormalMatrix) -> Vec<PricePath>
where
    G: PricePathGenerator + Sync,
{
    (0..shocks.rows())
        .into_par_iter()
        .map(|row| generator.generate(shocks.row(row)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::CorrelatedNormalGenerator;

    #[test]
    fn test_gbm_generation() {
        let gbm = GeometricBrownianMotion::new(100.0, 0.0, 0.2, 1.0);
        let path = gbm.generate(&[0.5, -1.0, 0.25]);

        assert_eq!(path.prices.len(), 4); // initial + 3 steps
        assert_eq!(path.prices[0], 100.0);

        let expected = 100.0 * (-0.02 + 0.2 * 0.5f64).exp();
        assert!((path.prices[1] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_start_price_is_exact() {
        let start = 43_217.123_456;
        let gbm = GeometricBrownianMotion::new(start, 0.3, 0.8, 1.0);
        let draws = CorrelatedNormalGenerator::new(0.0)
            .unwrap()
            .generate_seeded(11, 500, 6);
        for path in simulate_ensemble(&gbm, &draws.z1) {
            assert_eq!(path.prices[0], start);
            assert_eq!(path.prices.len(), 7);
        }
    }

    #[test]
    fn test_zero_volatility_is_compound_growth() {
        let drift = 0.15;
        let gbm = GeometricBrownianMotion::new(1_000.0, drift, 0.0, 1.0);
        let draws = CorrelatedNormalGenerator::new(0.2)
            .unwrap()
            .generate_seeded(3, 100, 8);
        let paths = simulate_ensemble(&gbm, &draws.z1);
        for path in &paths {
            assert_eq!(path, &paths[0]);
            for (t, price) in path.prices.iter().enumerate() {
                let expected = 1_000.0 * (drift * t as f64).exp();
                assert!((price - expected).abs() / expected < 1e-12);
            }
        }
    }

    #[test]
    fn test_same_shocks_same_path() {
        let gbm = GeometricBrownianMotion::new(250.0, 0.1, 0.5, 1.0);
        let shocks = [0.3, -0.2, 1.7, -2.2];
        assert_eq!(gbm.generate(&shocks), gbm.generate(&shocks));
    }

    #[test]
    fn test_deterministic_path_ignores_shocks() {
        let fixed = DeterministicPricePath::new(vec![10.0, 12.0, 9.0]);
        assert_eq!(fixed.generate(&[5.0, 5.0]).prices, vec![10.0, 12.0, 9.0]);
    }
}
