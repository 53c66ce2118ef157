// src/math_utils.rs
use crate::error::{SdeError, SdeResult};
use ndarray::Array2;
use statrs::function::erf;
use statrs::statistics::Statistics;
use std::f64::consts::{PI, SQRT_2};

/// Smallest standard deviation any Gaussian kernel is evaluated with
pub const SIGMA_FLOOR: f64 = 1e-3;

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Normal density with the width floored at [`SIGMA_FLOOR`]
///
/// A zero or negative `sigma` yields a sharply peaked but finite kernel.
pub fn norm_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let sigma = sigma.max(SIGMA_FLOOR);
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * PI).sqrt())
}

/// `num` evenly spaced points from `start` to `end` inclusive
///
/// `num == 1` yields `[start]`, `num == 0` an empty vector.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// Mean and sample standard deviation; NaN for empty input
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let mean = values.iter().mean();
    let std = if values.len() > 1 {
        values.iter().std_dev()
    } else {
        0.0
    };
    (mean, std)
}

/// Stack equally long rows into a `rows × cols` matrix
pub fn rows_to_matrix(rows: Vec<Vec<f64>>, cols: usize) -> SdeResult<Array2<f64>> {
    let n_rows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, cols), flat).map_err(|e| SdeError::NumericalInstability {
        method: "grid assembly".to_string(),
        reason: e.to_string(),
    })
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace_endpoints() {
        let grid = linspace(0.0, 1.0, 3);
        assert_eq!(grid, vec![0.0, 0.5, 1.0]);

        let grid = linspace(-4.0, 4.0, 100);
        assert_eq!(grid.len(), 100);
        assert_relative_eq!(grid[0], -4.0);
        assert_relative_eq!(grid[99], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linspace_degenerate() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.0, 1.0, 1), vec![0.0]);
    }

    #[test]
    fn test_norm_pdf_matches_closed_form() {
        assert_relative_eq!(norm_pdf(0.0, 0.0, 1.0), 0.398_942_280_4, epsilon = 1e-9);
        assert_relative_eq!(norm_pdf(1.0, 1.0, 2.0), 0.199_471_140_2, epsilon = 1e-9);
    }

    #[test]
    fn test_norm_pdf_zero_sigma_is_finite() {
        let peak = norm_pdf(0.0, 0.0, 0.0);
        assert!(peak.is_finite() && peak > 0.0);
        assert_eq!(norm_pdf(1.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_norm_cdf() {
        assert_relative_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(norm_cdf(1.959_963_985), 0.975, epsilon = 1e-6);
    }

    #[test]
    fn test_rows_to_matrix() {
        let m = rows_to_matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]], 2).unwrap();
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m[[2, 0]], 5.0);
        assert!(rows_to_matrix(vec![vec![1.0], vec![2.0, 3.0]], 2).is_err());

        let empty = rows_to_matrix(vec![Vec::new(); 4], 0).unwrap();
        assert_eq!(empty.dim(), (4, 0));
    }

    #[test]
    fn test_mean_and_std() {
        let (mean, std) = mean_and_std(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(mean, 2.5);
        assert_relative_eq!(std, 1.290_994_448_7, epsilon = 1e-9);

        let (_, single_std) = mean_and_std(&[5.0]);
        assert_eq!(single_std, 0.0);
    }
}
