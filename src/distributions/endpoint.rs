// src/distributions/endpoint.rs
//! Source/target endpoint distributions for the bridge demo
//!
//! Parameters are passed on every call; nothing is captured. `center` moves
//! the point mass and the Gaussian, `spread` sets the jitter of the
//! multi-modal variants and the Gaussian's standard deviation.

use crate::math_utils::norm_pdf;
use crate::rng::central_limit_normal;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Display width of the point mass density
const POINT_MASS_WIDTH: f64 = 0.15;
const MODE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointDistribution {
    /// Point mass at `center`
    #[default]
    Single,
    /// Modes at ±2, jittered by `spread`
    Bimodal,
    /// Uniform on [-2, 2)
    Uniform,
    /// `N(center, spread²)`
    Gaussian,
    /// Modes at -2, 0, 2, jittered by `spread`
    Trimodal,
}

impl EndpointDistribution {
    pub const ALL: [EndpointDistribution; 5] = [
        EndpointDistribution::Single,
        EndpointDistribution::Bimodal,
        EndpointDistribution::Uniform,
        EndpointDistribution::Gaussian,
        EndpointDistribution::Trimodal,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "single" => Some(EndpointDistribution::Single),
            "bimodal" => Some(EndpointDistribution::Bimodal),
            "uniform" => Some(EndpointDistribution::Uniform),
            "gaussian" => Some(EndpointDistribution::Gaussian),
            "trimodal" => Some(EndpointDistribution::Trimodal),
            _ => None,
        }
    }

    pub fn from_key_or_default(key: &str) -> Self {
        Self::from_key(key).unwrap_or_else(|| {
            warn!(selector = key, fallback = "single", "unknown endpoint distribution");
            EndpointDistribution::default()
        })
    }

    pub fn key(self) -> &'static str {
        match self {
            EndpointDistribution::Single => "single",
            EndpointDistribution::Bimodal => "bimodal",
            EndpointDistribution::Uniform => "uniform",
            EndpointDistribution::Gaussian => "gaussian",
            EndpointDistribution::Trimodal => "trimodal",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EndpointDistribution::Single => "Single Point",
            EndpointDistribution::Bimodal => "Bimodal",
            EndpointDistribution::Uniform => "Uniform",
            EndpointDistribution::Gaussian => "Gaussian",
            EndpointDistribution::Trimodal => "Trimodal",
        }
    }

    pub fn sample<R: Rng + ?Sized>(self, center: f64, spread: f64, rng: &mut R) -> f64 {
        match self {
            EndpointDistribution::Single => center,
            EndpointDistribution::Bimodal => {
                let mode = if rng.gen::<f64>() < 0.5 { -MODE } else { MODE };
                mode + (rng.gen::<f64>() - 0.5) * spread
            }
            EndpointDistribution::Uniform => (rng.gen::<f64>() - 0.5) * 2.0 * MODE,
            EndpointDistribution::Gaussian => center + spread * central_limit_normal(rng),
            EndpointDistribution::Trimodal => {
                let r: f64 = rng.gen();
                let mode = if r < 1.0 / 3.0 {
                    -MODE
                } else if r < 2.0 / 3.0 {
                    0.0
                } else {
                    MODE
                };
                mode + (rng.gen::<f64>() - 0.5) * spread
            }
        }
    }

    /// Density at `x`; zero spread is floored inside [`norm_pdf`]
    pub fn pdf(self, x: f64, center: f64, spread: f64) -> f64 {
        match self {
            EndpointDistribution::Single => norm_pdf(x, center, POINT_MASS_WIDTH),
            EndpointDistribution::Bimodal => {
                0.5 * norm_pdf(x, -MODE, spread) + 0.5 * norm_pdf(x, MODE, spread)
            }
            EndpointDistribution::Uniform => {
                if x.abs() <= MODE {
                    1.0 / (2.0 * MODE)
                } else {
                    0.0
                }
            }
            EndpointDistribution::Gaussian => norm_pdf(x, center, spread),
            EndpointDistribution::Trimodal => {
                (norm_pdf(x, -MODE, spread) + norm_pdf(x, 0.0, spread) + norm_pdf(x, MODE, spread))
                    / 3.0
            }
        }
    }
}

/// Same fallback as [`EndpointDistribution::from_key_or_default`], so a config file with an
/// unknown selector still loads
impl<'de> Deserialize<'de> for EndpointDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Self::from_key_or_default(&key))
    }
}

impl fmt::Display for EndpointDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
