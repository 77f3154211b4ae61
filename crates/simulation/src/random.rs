//! Correlated standard-normal draws.
//!
//! Each (path, step) cell gets an independent pair `(e1, e2)` from a
//! Box-Muller transform, then the Cholesky factor of `[[1, rho], [rho, 1]]`
//! is applied: `z1 = e1`, `z2 = rho * e1 + sqrt(1 - rho^2) * e2`.
//!
//! Seeded generation gives every path its own RNG stream derived from the run
//! seed, so rows can be filled in parallel and the result does not depend on
//! how work is scheduled.

use minesim_domain::error::{Result, SimulationError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::f64::consts::TAU;

/// Row-major matrix of draws, one row per path and one column per step.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl NormalMatrix {
    /// Creates a zero-filled matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix from explicit rows. All rows must share a length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return Err(SimulationError::invalid(
                "rows",
                rows.len(),
                "rows of equal length",
            ));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Draws of one path.
    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }

    /// All draws, row-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// The two shock matrices of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedDraws {
    /// Shocks for the primary series.
    pub z1: NormalMatrix,
    /// Shocks for the secondary series.
    pub z2: NormalMatrix,
}

/// Two independent standard normals from two uniforms.
///
/// The first uniform is redrawn while it is zero so `ln(u)` stays finite.
pub fn box_muller<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let mut u1: f64 = rng.random();
    while u1 <= 0.0 {
        u1 = rng.random();
    }
    let u2: f64 = rng.random();

    let radius = (-2.0 * u1.ln()).sqrt();
    let theta = TAU * u2;
    (radius * theta.cos(), radius * theta.sin())
}

/// RNG stream for one path of a seeded run.
#[must_use]
pub fn path_rng(seed: u64, path: usize) -> StdRng {
    // SplitMix64 increment spreads neighbouring path indices apart.
    StdRng::seed_from_u64(seed ^ (path as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
}

/// Generates pairs of correlated standard-normal draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelatedNormalGenerator {
    correlation: f64,
    complement: f64,
}

impl CorrelatedNormalGenerator {
    /// Creates a generator for correlation `rho` in (-1, 1).
    pub fn new(correlation: f64) -> Result<Self> {
        if !(correlation > -1.0 && correlation < 1.0) {
            return Err(SimulationError::invalid(
                "correlation",
                correlation,
                "a coefficient in (-1, 1)",
            ));
        }
        Ok(Self {
            correlation,
            complement: (1.0 - correlation * correlation).sqrt(),
        })
    }

    pub fn correlation(&self) -> f64 {
        self.correlation
    }

    /// Maps an independent pair to a correlated pair.
    #[must_use]
    pub fn correlate(&self, e1: f64, e2: f64) -> (f64, f64) {
        (e1, self.correlation * e1 + self.complement * e2)
    }

    /// Fills one path's rows of both matrices.
    pub fn fill_row<R: Rng + ?Sized>(&self, rng: &mut R, z1: &mut [f64], z2: &mut [f64]) {
        for (a, b) in z1.iter_mut().zip(z2.iter_mut()) {
            let (e1, e2) = box_muller(rng);
            (*a, *b) = self.correlate(e1, e2);
        }
    }

    /// Generates all draws sequentially from a single RNG.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        paths: usize,
        steps: usize,
    ) -> CorrelatedDraws {
        let mut z1 = NormalMatrix::zeros(paths, steps);
        let mut z2 = NormalMatrix::zeros(paths, steps);
        if steps > 0 {
            for (r1, r2) in z1.data.chunks_mut(steps).zip(z2.data.chunks_mut(steps)) {
                self.fill_row(rng, r1, r2);
            }
        }
        CorrelatedDraws { z1, z2 }
    }

    /// Generates all draws in parallel, one [`path_rng`] stream per path.
    ///
    /// The same seed always yields the same matrices.
    pub fn generate_seeded(&self, seed: u64, paths: usize, steps: usize) -> CorrelatedDraws {
        let mut z1 = NormalMatrix::zeros(paths, steps);
        let mut z2 = NormalMatrix::zeros(paths, steps);
        if steps > 0 {
            z1.data
                .par_chunks_mut(steps)
                .zip(z2.data.par_chunks_mut(steps))
                .enumerate()
                .for_each(|(path, (r1, r2))| {
                    let mut rng = path_rng(seed, path);
                    self.fill_row(&mut rng, r1, r2);
                });
        }
        CorrelatedDraws { z1, z2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::{mean, pearson_correlation, population_std_dev};

    #[test]
    fn test_rejects_boundary_correlation() {
        assert!(CorrelatedNormalGenerator::new(1.0).is_err());
        assert!(CorrelatedNormalGenerator::new(-1.0).is_err());
        assert!(CorrelatedNormalGenerator::new(0.999).is_ok());
    }

    #[test]
    fn test_correlate_applies_cholesky_factor() {
        let generator = CorrelatedNormalGenerator::new(0.6).unwrap();
        let (z1, z2) = generator.correlate(1.0, 2.0);
        assert_eq!(z1, 1.0);
        assert!((z2 - (0.6 + 0.8 * 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let generator = CorrelatedNormalGenerator::new(0.3).unwrap();
        let a = generator.generate_seeded(7, 200, 4);
        let b = generator.generate_seeded(7, 200, 4);
        let c = generator.generate_seeded(8, 200, 4);
        assert_eq!(a, b);
        assert_ne!(a.z1, c.z1);
    }

    #[test]
    fn test_shapes_match() {
        let generator = CorrelatedNormalGenerator::new(0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let draws = generator.generate(&mut rng, 12, 3);
        assert_eq!(draws.z1.rows(), 12);
        assert_eq!(draws.z2.cols(), 3);
        assert_eq!(draws.z1.row(11).len(), 3);
    }

    #[test]
    fn test_box_muller_is_standard_normal() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<f64> = (0..20_000)
            .flat_map(|_| {
                let (a, b) = box_muller(&mut rng);
                [a, b]
            })
            .collect();
        assert!(mean(&samples).unwrap().abs() < 0.03);
        assert!((population_std_dev(&samples).unwrap() - 1.0).abs() < 0.03);
    }

    #[test]
    fn test_empirical_correlation_matches_target() {
        for rho in [-0.7, 0.0, 0.45, 0.9] {
            let generator = CorrelatedNormalGenerator::new(rho).unwrap();
            let draws = generator.generate_seeded(2024, 5_000, 5);
            let measured = pearson_correlation(draws.z1.as_slice(), draws.z2.as_slice()).unwrap();
            assert!(
                (measured - rho).abs() < 0.05,
                "rho {rho}: measured {measured}"
            );
        }
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(NormalMatrix::from_rows(vec![vec![0.0, 1.0], vec![0.5]]).is_err());
        let matrix = NormalMatrix::from_rows(vec![vec![0.0, 1.0], vec![0.5, -0.5]]).unwrap();
        assert_eq!(matrix.row(1), &[0.5, -0.5]);
    }
}
