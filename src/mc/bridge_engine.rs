// src/mc/bridge_engine.rs
//! Diffusion Bridge Demo Engine
//!
//! Every path is seeded by one `(x, y)` pair drawn from (source, target).
//! At each grid time the closed-form marginal of the selected schedule is
//! sampled independently:
//! ```text
//! z_t = a_t · x + b_t · y + σ_t · ε,    ε fresh per time point
//! ```
//! so a "path" is a sequence of marginal draws, not a simulated trajectory.
//! The heatmap is a KDE over the same pairs (see [`super::density`]), or over
//! an independent pair set when `kde_pairs` is configured.

use super::density::kde_grid;
use super::{ensure_finite_density, ensure_finite_paths, grids, Simulator};
use crate::config::{BridgeConfig, Layers};
use crate::error::SdeResult;
use crate::math_utils::Timer;
use crate::models::bridge::{BridgeType, HORIZON_FLOOR};
use crate::rng::RngFactory;
use chrono::{DateTime, Utc};
use ndarray::Array2;
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Auxiliary stream index of the independent KDE pair set
const KDE_STREAM: u64 = 0;

/// One (source, target) draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePair {
    pub x: f64,
    pub y: f64,
}

impl SamplePair {
    pub fn draw<R: Rng + ?Sized>(cfg: &BridgeConfig, rng: &mut R) -> Self {
        let x = cfg
            .source_dist
            .sample(cfg.source_center, cfg.source_spread, rng);
        let y = cfg
            .target_dist
            .sample(cfg.target_center, cfg.target_spread, rng);
        SamplePair { x, y }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeSimulationResult {
    pub t: Vec<f64>,
    pub x_grid: Vec<f64>,
    /// `density[[i, j]]` estimates the marginal at `x_grid[i]`, `t[j]`
    pub density: Array2<f64>,
    pub paths: Vec<Vec<f64>>,
    pub pairs: Vec<SamplePair>,
    /// `(1 − s)·x̄ + s·ȳ`; empty unless the mean-path layer is enabled
    pub mean_path: Vec<f64>,
    pub source_marginal: Vec<f64>,
    pub target_marginal: Vec<f64>,
    pub source_mean: f64,
    pub target_mean: f64,
    pub model_type: BridgeType,
    pub layers: Layers,
    pub generated_at: DateTime<Utc>,
}

/// `count` pairs from the auxiliary stream, independent of every path
pub fn draw_pairs(cfg: &BridgeConfig, count: usize) -> Vec<SamplePair> {
    let mut rng = RngFactory::new(cfg.seed).create_auxiliary_rng(KDE_STREAM);
    (0..count).map(|_| SamplePair::draw(cfg, &mut rng)).collect()
}

/// Seed pairs and marginal samples for every path
pub fn generate_bridge_paths(
    cfg: &BridgeConfig,
    t_grid: &[f64],
) -> (Vec<SamplePair>, Vec<Vec<f64>>) {
    let factory = RngFactory::new(cfg.seed);
    let schedules: Vec<_> = t_grid
        .iter()
        .map(|&t| cfg.model_type.schedule(t, cfg.t_max, cfg.sigma_max))
        .collect();

    (0..cfg.paths)
        .into_par_iter()
        .map(|i| {
            let mut rng = factory.create_std_rng(i as u64);
            let pair = SamplePair::draw(cfg, &mut rng);
            let path: Vec<f64> = schedules
                .iter()
                .map(|sched| sched.sample(pair.x, pair.y, cfg.noise.draw(&mut rng)))
                .collect();
            (pair, path)
        })
        .unzip()
}

fn linear_mean_path(t_grid: &[f64], t_max: f64, source_mean: f64, target_mean: f64) -> Vec<f64> {
    let t_max = t_max.max(HORIZON_FLOOR);
    t_grid
        .iter()
        .map(|&t| {
            let s = t / t_max;
            (1.0 - s) * source_mean + s * target_mean
        })
        .collect()
}

/// Run the bridge demo for one configuration
///
/// # Errors
///
/// Returns `SdeError` for an invalid configuration, or `NumericalInstability`
/// if the estimate or any path is not finite.
pub fn generate_bridge(cfg: &BridgeConfig) -> SdeResult<BridgeSimulationResult> {
    cfg.validate()?;
    let mut timer = Timer::new();
    timer.start();

    let (t, x_grid) = grids(cfg.t_max, cfg.steps, cfg.x_range);
    let (pairs, paths) = generate_bridge_paths(cfg, &t);
    ensure_finite_paths(&paths, cfg.model_type.key())?;

    let density = match cfg.kde_pairs {
        Some(count) => {
            let independent = draw_pairs(cfg, count);
            kde_grid(cfg.model_type, &x_grid, &t, cfg.t_max, cfg.sigma_max, &independent)?
        }
        None => kde_grid(cfg.model_type, &x_grid, &t, cfg.t_max, cfg.sigma_max, &pairs)?,
    };
    ensure_finite_density(&density, "bridge KDE")?;

    let n = pairs.len() as f64;
    let source_mean = pairs.iter().map(|p| p.x).sum::<f64>() / n;
    let target_mean = pairs.iter().map(|p| p.y).sum::<f64>() / n;

    let mean_path = if cfg.layers.contains(Layers::MEAN_PATH) {
        linear_mean_path(&t, cfg.t_max, source_mean, target_mean)
    } else {
        Vec::new()
    };

    let source_marginal = x_grid
        .iter()
        .map(|&x| cfg.source_dist.pdf(x, cfg.source_center, cfg.source_spread))
        .collect();
    let target_marginal = x_grid
        .iter()
        .map(|&x| cfg.target_dist.pdf(x, cfg.target_center, cfg.target_spread))
        .collect();

    debug!(
        model = %cfg.model_type,
        source = %cfg.source_dist,
        target = %cfg.target_dist,
        steps = cfg.steps,
        paths = cfg.paths,
        kde_pairs = cfg.kde_pairs.unwrap_or(cfg.paths),
        elapsed_ms = timer.elapsed_ms(),
        "bridge simulation generated"
    );

    Ok(BridgeSimulationResult {
        t,
        x_grid,
        density,
        paths,
        pairs,
        mean_path,
        source_marginal,
        target_marginal,
        source_mean,
        target_mean,
        model_type: cfg.model_type,
        layers: cfg.layers,
        generated_at: Utc::now(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct BridgeSimulator {
    pub config: BridgeConfig,
}

impl BridgeSimulator {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }
}

impl Simulator for BridgeSimulator {
    type Output = BridgeSimulationResult;

    fn generate(&self) -> SdeResult<BridgeSimulationResult> {
        generate_bridge(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::EndpointDistribution;
    use approx::assert_relative_eq;

    fn point_masses() -> BridgeConfig {
        BridgeConfig {
            source_dist: EndpointDistribution::Single,
            target_dist: EndpointDistribution::Single,
            source_center: -2.0,
            target_center: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_shapes() {
        let cfg = BridgeConfig {
            steps: 50,
            paths: 7,
            ..Default::default()
        };
        let result = generate_bridge(&cfg).unwrap();
        assert_eq!(result.t.len(), 50);
        assert_eq!(result.paths.len(), 7);
        assert!(result.paths.iter().all(|p| p.len() == 50));
        assert_eq!(result.pairs.len(), 7);
        assert_eq!(result.density.dim(), (100, 50));
        assert_eq!(result.mean_path.len(), 50);
    }

    #[test]
    fn test_paths_pinned_at_both_ends() {
        // every schedule has σ_t = 0 at s = 0 and s = 1; DBIM runs data-end first
        for model_type in BridgeType::ALL {
            let cfg = BridgeConfig {
                model_type,
                ..point_masses()
            };
            let (first, last) = match model_type {
                BridgeType::Dbim => (2.0, -2.0),
                _ => (-2.0, 2.0),
            };
            let result = generate_bridge(&cfg).unwrap();
            for path in &result.paths {
                assert_relative_eq!(path[0], first, epsilon = 1e-9);
                assert_relative_eq!(*path.last().unwrap(), last, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_mean_path_interpolates_endpoint_means() {
        let cfg = BridgeConfig {
            steps: 3,
            ..point_masses()
        };
        let result = generate_bridge(&cfg).unwrap();
        assert_relative_eq!(result.source_mean, -2.0);
        assert_relative_eq!(result.target_mean, 2.0);
        assert_relative_eq!(result.mean_path[0], -2.0);
        assert_relative_eq!(result.mean_path[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.mean_path[2], 2.0);
    }

    #[test]
    fn test_mean_path_layer_off() {
        let mut cfg = BridgeConfig::default();
        cfg.layers.remove(Layers::MEAN_PATH);
        assert!(generate_bridge(&cfg).unwrap().mean_path.is_empty());
    }

    #[test]
    fn test_independent_kde_pairs_change_density_only() {
        let shared = BridgeConfig::default();
        let independent = BridgeConfig {
            kde_pairs: Some(400),
            ..Default::default()
        };
        let a = generate_bridge(&shared).unwrap();
        let b = generate_bridge(&independent).unwrap();
        assert_eq!(a.paths, b.paths);
        assert_eq!(a.pairs, b.pairs);
        assert_ne!(a.density, b.density);
    }

    #[test]
    fn test_dbim_large_sigma_max_generates() {
        let cfg = BridgeConfig {
            model_type: BridgeType::Dbim,
            sigma_max: 30.0,
            ..Default::default()
        };
        let result = generate_bridge(&cfg).unwrap();
        assert!(result.paths.iter().flatten().all(|z| z.is_finite()));
        assert!(result.density.iter().all(|p| p.is_finite() && *p >= 0.0));
    }

    #[test]
    fn test_draw_pairs_is_reproducible() {
        let cfg = BridgeConfig::default();
        assert_eq!(draw_pairs(&cfg, 25), draw_pairs(&cfg, 25));
        assert_eq!(draw_pairs(&cfg, 25).len(), 25);
    }

    #[test]
    fn test_endpoint_marginals_on_grid() {
        let result = generate_bridge(&point_masses()).unwrap();
        assert_eq!(result.source_marginal.len(), result.x_grid.len());
        let peak = result
            .source_marginal
            .iter()
            .cloned()
            .fold(f64::MIN, f64::max);
        assert!(peak > 2.0);
    }
}
