// src/distributions/initial.rs
//! Initial (data) distributions for the forward SDE demo
//!
//! `pdf(x, μ, σ)` is not the density of the data itself but its marginal after
//! the forward process has scaled the data by `μ = μ(t)` and added Gaussian
//! noise of width `σ`. Evaluating at `(μ, σ) = (1, small)` recovers (a slightly
//! smoothed) data density.

use crate::math_utils::{norm_cdf, norm_pdf, SIGMA_FLOOR};
use crate::rng::open_uniform;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

const MODE: f64 = 2.0;
const JITTER: f64 = 0.5;
const LAPLACE_SCALE: f64 = 0.8;
const WIDE_SCALE: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialDistribution {
    /// Equal modes at ±2
    #[default]
    Bimodal,
    /// Uniform on [-2, 2)
    Uniform,
    /// Narrow cluster around 0
    Single,
    /// Equal modes at -2, 0, 2
    Trimodal,
    /// 70/30 modes at -2 and 2
    Asymmetric,
    /// Laplace with scale 0.8, heavy tails
    Laplace,
    /// Broad uniform data rendered as a wide Gaussian
    Wide,
}

impl InitialDistribution {
    pub const ALL: [InitialDistribution; 7] = [
        InitialDistribution::Bimodal,
        InitialDistribution::Uniform,
        InitialDistribution::Single,
        InitialDistribution::Trimodal,
        InitialDistribution::Asymmetric,
        InitialDistribution::Laplace,
        InitialDistribution::Wide,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "bimodal" => Some(InitialDistribution::Bimodal),
            "uniform" => Some(InitialDistribution::Uniform),
            "single" => Some(InitialDistribution::Single),
            "trimodal" => Some(InitialDistribution::Trimodal),
            "asymmetric" => Some(InitialDistribution::Asymmetric),
            "laplace" => Some(InitialDistribution::Laplace),
            "wide" => Some(InitialDistribution::Wide),
            _ => None,
        }
    }

    pub fn from_key_or_default(key: &str) -> Self {
        Self::from_key(key).unwrap_or_else(|| {
            warn!(selector = key, fallback = "bimodal", "unknown initial distribution");
            InitialDistribution::default()
        })
    }

    pub fn key(self) -> &'static str {
        match self {
            InitialDistribution::Bimodal => "bimodal",
            InitialDistribution::Uniform => "uniform",
            InitialDistribution::Single => "single",
            InitialDistribution::Trimodal => "trimodal",
            InitialDistribution::Asymmetric => "asymmetric",
            InitialDistribution::Laplace => "laplace",
            InitialDistribution::Wide => "wide",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InitialDistribution::Bimodal => "Bimodal Gaussian",
            InitialDistribution::Uniform => "Uniform Distribution",
            InitialDistribution::Single => "Single Gaussian",
            InitialDistribution::Trimodal => "Trimodal Gaussian",
            InitialDistribution::Asymmetric => "Asymmetric Bimodal",
            InitialDistribution::Laplace => "Laplace (Heavy Tails)",
            InitialDistribution::Wide => "Wide Gaussian",
        }
    }

    /// Draw one starting point
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        match self {
            InitialDistribution::Bimodal => {
                let mode = if rng.gen::<f64>() < 0.5 { -MODE } else { MODE };
                mode + jitter(rng)
            }
            InitialDistribution::Uniform | InitialDistribution::Wide => {
                (rng.gen::<f64>() - 0.5) * 2.0 * MODE
            }
            InitialDistribution::Single => jitter(rng),
            InitialDistribution::Trimodal => {
                let r: f64 = rng.gen();
                let mode = if r < 1.0 / 3.0 {
                    -MODE
                } else if r < 2.0 / 3.0 {
                    0.0
                } else {
                    MODE
                };
                mode + jitter(rng)
            }
            InitialDistribution::Asymmetric => {
                let mode = if rng.gen::<f64>() < 0.7 { -MODE } else { MODE };
                mode + jitter(rng)
            }
            InitialDistribution::Laplace => {
                // inverse CDF on an open interval so ln never sees 0
                let u = open_uniform(rng) - 0.5;
                if u < 0.0 {
                    LAPLACE_SCALE * (1.0 + 2.0 * u).ln()
                } else {
                    -LAPLACE_SCALE * (1.0 - 2.0 * u).ln()
                }
            }
        }
    }

    /// Marginal density at `x` after scaling by `mu` and smoothing by `sigma`
    pub fn pdf(self, x: f64, mu: f64, sigma: f64) -> f64 {
        let sigma = sigma.max(SIGMA_FLOOR);
        match self {
            InitialDistribution::Bimodal => {
                0.5 * norm_pdf(x, -MODE * mu, sigma) + 0.5 * norm_pdf(x, MODE * mu, sigma)
            }
            InitialDistribution::Uniform => smoothed_uniform(x, MODE * mu.abs(), sigma),
            InitialDistribution::Single => norm_pdf(x, 0.0, sigma),
            InitialDistribution::Trimodal => {
                (norm_pdf(x, -MODE * mu, sigma)
                    + norm_pdf(x, 0.0, sigma)
                    + norm_pdf(x, MODE * mu, sigma))
                    / 3.0
            }
            InitialDistribution::Asymmetric => {
                0.7 * norm_pdf(x, -MODE * mu, sigma) + 0.3 * norm_pdf(x, MODE * mu, sigma)
            }
            InitialDistribution::Laplace => {
                // moment-matched Gaussian: Var[Laplace(b)] = 2b²
                let data_var = 2.0 * LAPLACE_SCALE * LAPLACE_SCALE;
                norm_pdf(x, 0.0, (sigma * sigma + data_var * mu * mu).sqrt())
            }
            InitialDistribution::Wide => {
                norm_pdf(x, 0.0, (sigma * sigma + WIDE_SCALE * WIDE_SCALE * mu * mu).sqrt())
            }
        }
    }

    /// Starting points of the probability-flow trajectories
    pub fn representative_points(self) -> &'static [f64] {
        match self {
            InitialDistribution::Uniform => &[-2.0, 0.0, 2.0],
            InitialDistribution::Single => &[-1.0, 0.0, 1.0],
            _ => &[-2.0, 2.0],
        }
    }
}

/// Same fallback as [`InitialDistribution::from_key_or_default`], so a config file with an
/// unknown selector still loads
impl<'de> Deserialize<'de> for InitialDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Self::from_key_or_default(&key))
    }
}

impl fmt::Display for InitialDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.gen::<f64>() - 0.5) * JITTER
}

/// Uniform on `[-half_width, half_width]` convolved with `N(0, sigma²)`
fn smoothed_uniform(x: f64, half_width: f64, sigma: f64) -> f64 {
    if half_width < 1e-12 {
        return norm_pdf(x, 0.0, sigma);
    }
    let mass = norm_cdf((x + half_width) / sigma) - norm_cdf((x - half_width) / sigma);
    mass.max(0.0) / (2.0 * half_width)
}
