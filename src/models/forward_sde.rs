// src/models/forward_sde.rs
//! Forward (noising) SDEs used by score-based diffusion models
//!
//! # Mathematical Framework
//!
//! All three families are linear, `dx = -β x dt + g(t) dw`, so the marginal of
//! a point mass `x₀` stays Gaussian:
//! ```text
//! x_t | x₀ ~ N(x₀ · μ(t), v(t))
//! ```
//!
//! | type  | drift     | g(t)      | μ(t)      | v(t)                 |
//! |-------|-----------|-----------|-----------|----------------------|
//! | VP    | -x/2      | 1         | e^{-t/2}  | 1 - e^{-t}           |
//! | VE    | 0         | √(2t+1)   | 1         | t²                   |
//! | SubVP | -x/4      | 0.8       | e^{-t/4}  | 0.64 (1 - e^{-t/2})  |
//!
//! `μ` drives the probability-flow (ODE) trajectories and, together with `v`,
//! the closed-form density heatmap.

use super::model::SDEModel;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Forward SDE family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SdeType {
    /// Variance preserving
    #[default]
    Vp,
    /// Variance exploding
    Ve,
    /// Sub-variance preserving
    SubVp,
}

/// Coefficients of a forward SDE at a single time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SdeCoefficients {
    /// Linear drift rate β, so that drift(x) = β · x
    pub drift_rate: f64,
    pub diffusion: f64,
    pub mu_decay: f64,
    pub variance: f64,
}

impl SdeType {
    pub const ALL: [SdeType; 3] = [SdeType::Vp, SdeType::Ve, SdeType::SubVp];

    /// Strict selector lookup
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "vp" => Some(SdeType::Vp),
            "ve" => Some(SdeType::Ve),
            "subvp" => Some(SdeType::SubVp),
            _ => None,
        }
    }

    /// Selector lookup falling back to VP, with a warning
    pub fn from_key_or_default(key: &str) -> Self {
        Self::from_key(key).unwrap_or_else(|| {
            warn!(selector = key, fallback = "vp", "unknown SDE type");
            SdeType::default()
        })
    }

    pub fn key(self) -> &'static str {
        match self {
            SdeType::Vp => "vp",
            SdeType::Ve => "ve",
            SdeType::SubVp => "subvp",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SdeType::Vp => "Variance Preserving (VP-SDE)",
            SdeType::Ve => "Variance Exploding (VE-SDE)",
            SdeType::SubVp => "Sub-VP SDE",
        }
    }

    /// Forward equation in LaTeX
    pub fn formula(self) -> &'static str {
        match self {
            SdeType::Vp => r"$dx = -\frac{1}{2}x dt + dw$",
            SdeType::Ve => r"$dx = \sqrt{2t+1} dw$",
            SdeType::SubVp => r"$dx = -\frac{1}{4}x dt + 0.8 dw$",
        }
    }

    /// Reverse-time equation in LaTeX
    pub fn reverse_formula(self) -> &'static str {
        match self {
            SdeType::Vp => r"$dx = [-\frac{1}{2}x - \nabla\log p(x)]dt + dw$",
            SdeType::Ve => r"$dx = -\sqrt{2t+1} \nabla\log p(x) dt + \sqrt{2t+1} dw$",
            SdeType::SubVp => r"$dx = [-\frac{1}{4}x - 0.64\nabla\log p(x)]dt + 0.8 dw$",
        }
    }

    fn drift_rate(self) -> f64 {
        match self {
            SdeType::Vp => -0.5,
            SdeType::Ve => 0.0,
            SdeType::SubVp => -0.25,
        }
    }

    /// Mean scaling μ(t) applied to the starting point
    pub fn mu_decay(self, t: f64) -> f64 {
        match self {
            SdeType::Vp => (-0.5 * t).exp(),
            SdeType::Ve => 1.0,
            SdeType::SubVp => (-0.25 * t).exp(),
        }
    }

    /// Conditional variance v(t) of a point mass
    pub fn variance(self, t: f64) -> f64 {
        match self {
            SdeType::Vp => 1.0 - (-t).exp(),
            SdeType::Ve => t * t,
            SdeType::SubVp => 0.64 * (1.0 - (-0.5 * t).exp()),
        }
    }

    pub fn coefficients(self, t: f64) -> SdeCoefficients {
        SdeCoefficients {
            drift_rate: self.drift_rate(),
            diffusion: self.diffusion(0.0, t),
            mu_decay: self.mu_decay(t),
            variance: self.variance(t),
        }
    }
}

impl SDEModel for SdeType {
    fn drift(&self, x: f64, _t: f64) -> f64 {
        self.drift_rate() * x
    }

    fn diffusion(&self, _x: f64, t: f64) -> f64 {
        match self {
            SdeType::Vp => 1.0,
            SdeType::Ve => (2.0 * t + 1.0).sqrt(),
            SdeType::SubVp => 0.8,
        }
    }
}

/// Same fallback as [`SdeType::from_key_or_default`], so a config file with an
/// unknown selector still loads
impl<'de> Deserialize<'de> for SdeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Self::from_key_or_default(&key))
    }
}

impl fmt::Display for SdeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
