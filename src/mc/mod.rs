//! Path generation and density estimation for both demos

pub mod bridge_engine;
pub mod density;
pub mod sde_engine;

use crate::error::{SdeError, SdeResult};
use crate::math_utils::linspace;
use ndarray::Array2;

/// Number of points on the spatial axis of every heatmap
pub const SPATIAL_GRID_SIZE: usize = 100;

/// Anything that turns its configuration into a fresh result on demand
pub trait Simulator {
    type Output;

    fn generate(&self) -> SdeResult<Self::Output>;
}

/// Shared `(time, space)` grids
pub(crate) fn grids(t_max: f64, steps: usize, x_range: (f64, f64)) -> (Vec<f64>, Vec<f64>) {
    (
        linspace(0.0, t_max, steps),
        linspace(x_range.0, x_range.1, SPATIAL_GRID_SIZE),
    )
}

/// Reject results containing NaN or infinite density cells
pub(crate) fn ensure_finite_density(density: &Array2<f64>, method: &str) -> SdeResult<()> {
    match density.iter().position(|p| !p.is_finite() || *p < 0.0) {
        None => Ok(()),
        Some(flat) => {
            let cols = density.ncols().max(1);
            Err(SdeError::NumericalInstability {
                method: method.to_string(),
                reason: format!(
                    "density cell ({}, {}) is {}",
                    flat / cols,
                    flat % cols,
                    density.iter().nth(flat).copied().unwrap_or(f64::NAN)
                ),
            })
        }
    }
}

/// Reject trajectories that left the reals
pub(crate) fn ensure_finite_paths(paths: &[Vec<f64>], method: &str) -> SdeResult<()> {
    match paths
        .iter()
        .position(|path| path.iter().any(|x| !x.is_finite()))
    {
        None => Ok(()),
        Some(index) => Err(SdeError::NumericalInstability {
            method: method.to_string(),
            reason: format!("path {} contains a non-finite value", index),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grids() {
        let (t, x) = grids(1.0, 3, (-4.0, 4.0));
        assert_eq!(t, vec![0.0, 0.5, 1.0]);
        assert_eq!(x.len(), SPATIAL_GRID_SIZE);
    }

    #[test]
    fn test_non_finite_density_is_reported() {
        let mut density = Array2::<f64>::zeros((3, 4));
        assert!(ensure_finite_density(&density, "test").is_ok());

        density[[2, 1]] = f64::NAN;
        let err = ensure_finite_density(&density, "test").unwrap_err();
        assert!(err.to_string().contains("(2, 1)"));
    }

    #[test]
    fn test_non_finite_path_is_reported() {
        let paths = vec![vec![0.0, 1.0], vec![0.0, f64::INFINITY]];
        let err = ensure_finite_paths(&paths, "test").unwrap_err();
        assert!(err.to_string().contains("path 1"));
    }
}
