// src/mc/sde_engine.rs
//! Forward SDE Demo Engine
//!
//! # Outputs
//!
//! One call to [`generate_sde`] produces everything the SDE view plots:
//!
//! 1. **Heatmap**: the exact marginal `p_t(x)` on a 100 × `steps` grid
//! 2. **SDE paths**: `paths` Euler-Maruyama trajectories from sampled `x₀`
//! 3. **ODE paths**: `x₀ · μ(t)` from a few representative starting points
//! 4. **Reference marginals**: the data density and the N(0,1) prior
//!
//! # Reproducibility
//!
//! Path `i` draws its starting point and every increment from
//! `StdRng::seed_from_u64(seed + i)`, so results are identical for a given
//! configuration regardless of how rayon schedules the paths.

use super::{ensure_finite_density, ensure_finite_paths, grids, Simulator};
use crate::analytics::sde_density;
use crate::config::{Layers, SdeConfig};
use crate::error::SdeResult;
use crate::math_utils::{mean_and_std, Timer};
use crate::models::forward_sde::SdeType;
use crate::rng::RngFactory;
use crate::solvers::euler_maruyama::EulerMaruyama;
use chrono::{DateTime, Utc};
use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Start/end statistics across the stochastic trajectories
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSummary {
    pub mean_start: f64,
    pub std_start: f64,
    pub mean_end: f64,
    pub std_end: f64,
}

impl PathSummary {
    fn from_paths(paths: &[Vec<f64>]) -> Self {
        let starts: Vec<f64> = paths.iter().filter_map(|p| p.first().copied()).collect();
        let ends: Vec<f64> = paths.iter().filter_map(|p| p.last().copied()).collect();
        let (mean_start, std_start) = mean_and_std(&starts);
        let (mean_end, std_end) = mean_and_std(&ends);
        PathSummary {
            mean_start,
            std_start,
            mean_end,
            std_end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdeSimulationResult {
    pub t: Vec<f64>,
    pub x_grid: Vec<f64>,
    /// `density[[i, j]]` is the marginal at `x_grid[i]`, `t[j]`
    pub density: Array2<f64>,
    pub sde_paths: Vec<Vec<f64>>,
    /// Empty unless the ODE layer is enabled
    pub ode_paths: Vec<Vec<f64>>,
    pub marginal_data: Vec<f64>,
    pub marginal_prior: Vec<f64>,
    pub summary: PathSummary,
    pub sde_type: SdeType,
    pub formula: &'static str,
    pub reverse_formula: &'static str,
    pub layers: Layers,
    pub generated_at: DateTime<Utc>,
}

/// Stochastic trajectories, one per path, each `steps` long
pub fn generate_sde_paths(cfg: &SdeConfig) -> Vec<Vec<f64>> {
    let factory = RngFactory::new(cfg.seed);
    let dt = cfg.dt();

    (0..cfg.paths)
        .into_par_iter()
        .map(|i| {
            let mut rng = factory.create_std_rng(i as u64);
            let x0 = cfg.initial_dist.sample(&mut rng);
            EulerMaruyama::integrate(&cfg.sde_type, x0, dt, cfg.steps, cfg.noise, &mut rng)
        })
        .collect()
}

/// Probability-flow trajectories `x₀ · μ(t)` on the given time grid
pub fn generate_ode_paths(cfg: &SdeConfig, t_grid: &[f64]) -> Vec<Vec<f64>> {
    cfg.initial_dist
        .representative_points()
        .iter()
        .map(|&x0| {
            t_grid
                .iter()
                .map(|&t| x0 * cfg.sde_type.mu_decay(t))
                .collect()
        })
        .collect()
}

/// Run the forward SDE demo for one configuration
///
/// # Errors
///
/// Returns `SdeError` for an invalid configuration, or `NumericalInstability`
/// if any density cell or trajectory is not finite.
pub fn generate_sde(cfg: &SdeConfig) -> SdeResult<SdeSimulationResult> {
    cfg.validate()?;
    let mut timer = Timer::new();
    timer.start();

    let (t, x_grid) = grids(cfg.t_max, cfg.steps, cfg.x_range);

    let density = sde_density::density_grid(cfg.sde_type, cfg.initial_dist, &x_grid, &t)?;
    ensure_finite_density(&density, "analytical SDE density")?;

    let sde_paths = generate_sde_paths(cfg);
    ensure_finite_paths(&sde_paths, "Euler-Maruyama")?;

    let ode_paths = if cfg.layers.contains(Layers::ODE_PATHS) {
        generate_ode_paths(cfg, &t)
    } else {
        Vec::new()
    };

    let summary = PathSummary::from_paths(&sde_paths);
    let marginal_data = sde_density::data_marginal(cfg.initial_dist, &x_grid);
    let marginal_prior = sde_density::prior_marginal(&x_grid);

    debug!(
        sde = %cfg.sde_type,
        initial = %cfg.initial_dist,
        steps = cfg.steps,
        paths = cfg.paths,
        elapsed_ms = timer.elapsed_ms(),
        "sde simulation generated"
    );

    Ok(SdeSimulationResult {
        t,
        x_grid,
        density,
        sde_paths,
        ode_paths,
        marginal_data,
        marginal_prior,
        summary,
        sde_type: cfg.sde_type,
        formula: cfg.sde_type.formula(),
        reverse_formula: cfg.sde_type.reverse_formula(),
        layers: cfg.layers,
        generated_at: Utc::now(),
    })
}

/// Owns a configuration snapshot for repeated regeneration
#[derive(Debug, Clone, Default)]
pub struct SdeSimulator {
    pub config: SdeConfig,
}

impl SdeSimulator {
    pub fn new(config: SdeConfig) -> Self {
        Self { config }
    }
}

impl Simulator for SdeSimulator {
    type Output = SdeSimulationResult;

    fn generate(&self) -> SdeResult<SdeSimulationResult> {
        generate_sde(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::InitialDistribution;
    use approx::assert_relative_eq;

    #[test]
    fn test_ode_paths_follow_mu_decay() {
        let cfg = SdeConfig {
            steps: 3,
            t_max: 1.0,
            sde_type: SdeType::Vp,
            initial_dist: InitialDistribution::Bimodal,
            ..Default::default()
        };
        let result = generate_sde(&cfg).unwrap();

        assert_eq!(result.t, vec![0.0, 0.5, 1.0]);
        assert_eq!(result.ode_paths.len(), 2);
        let from_two = &result.ode_paths[1];
        assert_relative_eq!(from_two[0], 2.0);
        assert_relative_eq!(from_two[1], 1.5576, epsilon = 1e-3);
        assert_relative_eq!(from_two[2], 1.2131, epsilon = 1e-3);
    }

    #[test]
    fn test_ode_layer_off_skips_ode_paths() {
        let mut cfg = SdeConfig::default();
        cfg.layers.remove(Layers::ODE_PATHS);
        let result = generate_sde(&cfg).unwrap();
        assert!(result.ode_paths.is_empty());
        assert_eq!(result.sde_paths.len(), cfg.paths);
    }

    #[test]
    fn test_paths_start_from_initial_samples() {
        let cfg = SdeConfig {
            paths: 50,
            initial_dist: InitialDistribution::Bimodal,
            ..Default::default()
        };
        for path in generate_sde_paths(&cfg) {
            assert!((path[0].abs() - 2.0).abs() <= 0.25);
        }
    }

    #[test]
    fn test_summary_reflects_paths() {
        let cfg = SdeConfig {
            paths: 200,
            ..Default::default()
        };
        let result = generate_sde(&cfg).unwrap();
        let ends: Vec<f64> = result.sde_paths.iter().map(|p| *p.last().unwrap()).collect();
        let mean_end = ends.iter().sum::<f64>() / ends.len() as f64;
        assert_relative_eq!(result.summary.mean_end, mean_end, epsilon = 1e-12);
        assert!(result.summary.std_start > 1.5);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let cfg = SdeConfig {
            t_max: 0.0,
            ..Default::default()
        };
        assert!(generate_sde(&cfg).is_err());
    }

    #[test]
    fn test_simulator_matches_free_function() {
        let cfg = SdeConfig {
            steps: 20,
            ..Default::default()
        };
        let a = SdeSimulator::new(cfg.clone()).generate().unwrap();
        let b = generate_sde(&cfg).unwrap();
        assert_eq!(a.sde_paths, b.sde_paths);
        assert_eq!(a.density, b.density);
    }
}
