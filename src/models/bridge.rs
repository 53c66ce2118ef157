// src/models/bridge.rs
//! Diffusion Bridge Schedules
//!
//! # Mathematical Framework
//!
//! Every bridge interpolates a source sample `x` and a target sample `y`:
//! ```text
//! z_t = a_t · x + b_t · y + σ_t · ε,    ε ~ N(0, 1)
//! ```
//! The schedules differ only in the coefficients `(a_t, b_t, σ_t)`. With
//! `s = t/T`:
//!
//! - **DDBM**: `a = 1-s`, `b = s`, `σ = σ_max √(4s(1-s))`
//! - **I2SB**: `a = 1-s`, `b = s`, `σ = 2 σ_max min(s, 1-s)`
//! - **DDIB**: source → N(0,1) latent → target, switching at `s = ½`
//! - **DBIM**: VP noise schedule (β_min = 0.1, β_d = 2.0) with `b_t` the weight
//!   on the data end, see [`BridgeType::schedule`]
//! - **Turbo**: linear transport with vestigial noise `0.1 σ_max sin(πs)`
//!
//! Bridge paths are not integrated: each grid point is an independent draw of
//! the marginal `z_t | (x, y)`.

use serde::{Deserialize, Deserializer, Serialize};
use std::f64::consts::PI;
use std::fmt;
use tracing::warn;

/// Floor applied to the horizon before forming `s = t/T`
pub const HORIZON_FLOOR: f64 = 1e-10;

const DBIM_BETA_MIN: f64 = 0.1;
const DBIM_BETA_D: f64 = 2.0;
const DBIM_DIVISION_FLOOR: f64 = 1e-20;

/// Bridge construction scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeType {
    #[default]
    Ddbm,
    I2sb,
    Ddib,
    Dbim,
    Turbo,
}

/// Interpolation coefficients `(a_t, b_t, σ_t)` at one time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BridgeSchedule {
    pub a_t: f64,
    pub b_t: f64,
    pub sigma_t: f64,
}

impl BridgeSchedule {
    /// Conditional mean `a_t x + b_t y`
    pub fn mean(&self, x: f64, y: f64) -> f64 {
        self.a_t * x + self.b_t * y
    }

    /// `z_t` for a given standard-normal draw
    pub fn sample(&self, x: f64, y: f64, eps: f64) -> f64 {
        self.mean(x, y) + self.sigma_t * eps
    }
}

impl BridgeType {
    pub const ALL: [BridgeType; 5] = [
        BridgeType::Ddbm,
        BridgeType::I2sb,
        BridgeType::Ddib,
        BridgeType::Dbim,
        BridgeType::Turbo,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ddbm" => Some(BridgeType::Ddbm),
            "i2sb" => Some(BridgeType::I2sb),
            "ddib" => Some(BridgeType::Ddib),
            "dbim" => Some(BridgeType::Dbim),
            "turbo" => Some(BridgeType::Turbo),
            _ => None,
        }
    }

    /// Selector lookup falling back to DDBM, with a warning
    pub fn from_key_or_default(key: &str) -> Self {
        Self::from_key(key).unwrap_or_else(|| {
            warn!(selector = key, fallback = "ddbm", "unknown bridge type");
            BridgeType::default()
        })
    }

    pub fn key(self) -> &'static str {
        match self {
            BridgeType::Ddbm => "ddbm",
            BridgeType::I2sb => "i2sb",
            BridgeType::Ddib => "ddib",
            BridgeType::Dbim => "dbim",
            BridgeType::Turbo => "turbo",
        }
    }

    /// Coefficients at time `t` on a horizon `t_max`
    pub fn schedule(self, t: f64, t_max: f64, sigma_max: f64) -> BridgeSchedule {
        let t_max = t_max.max(HORIZON_FLOOR);
        let s = t / t_max;
        match self {
            BridgeType::Ddbm => BridgeSchedule {
                a_t: 1.0 - s,
                b_t: s,
                sigma_t: sigma_max * (4.0 * s * (1.0 - s)).max(0.0).sqrt(),
            },
            BridgeType::I2sb => BridgeSchedule {
                a_t: 1.0 - s,
                b_t: s,
                sigma_t: sigma_max * 2.0 * s.min(1.0 - s),
            },
            BridgeType::Ddib => ddib(s),
            BridgeType::Dbim => dbim(s * sigma_max, sigma_max),
            BridgeType::Turbo => BridgeSchedule {
                a_t: 1.0 - s,
                b_t: s,
                sigma_t: sigma_max * 0.1 * (PI * s).sin(),
            },
        }
    }

    /// One independent draw of `z_t | (x, y)`
    pub fn sample(self, x: f64, y: f64, t: f64, t_max: f64, sigma_max: f64, eps: f64) -> f64 {
        self.schedule(t, t_max, sigma_max).sample(x, y, eps)
    }
}

/// Same fallback as [`BridgeType::from_key_or_default`], so a config file with an
/// unknown selector still loads
impl<'de> Deserialize<'de> for BridgeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Self::from_key_or_default(&key))
    }
}

impl fmt::Display for BridgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn ddib(s: f64) -> BridgeSchedule {
    if s <= 0.5 {
        // source -> latent
        let ss = 2.0 * s;
        BridgeSchedule {
            a_t: (1.0 - ss).max(0.0).sqrt(),
            b_t: 0.0,
            sigma_t: ss.max(0.0).sqrt(),
        }
    } else {
        // latent -> target
        let ss = 2.0 * (s - 0.5);
        BridgeSchedule {
            a_t: 0.0,
            b_t: ss.max(0.0).sqrt(),
            sigma_t: (1.0 - ss).max(0.0).sqrt(),
        }
    }
}

/// Integrated VP noise rate `L(σ) = β_min σ + ½ β_d σ²`
fn dbim_log_rate(sigma: f64) -> f64 {
    DBIM_BETA_MIN * sigma + 0.5 * DBIM_BETA_D * sigma * sigma
}

/// DBIM coefficients at rescaled diffusion time `sigma ∈ [0, sigma_end]`
///
/// With `α = e^{-L/2}` and `ρ² = e^L - 1`:
/// ```text
/// a_t = (α_t/α_T) ρ_t²/ρ_T²,   b_t = α_t (1 - ρ_t²/ρ_T²),   σ_t = α_t ρ_t √(1 - ρ_t²/ρ_T²)
/// ```
/// Every ratio is formed from `L_t - L_T`, so large `sigma_end` cannot overflow.
fn dbim(sigma: f64, sigma_end: f64) -> BridgeSchedule {
    let log_t = dbim_log_rate(sigma);
    let log_end = dbim_log_rate(sigma_end);

    if log_end.exp_m1() <= DBIM_DIVISION_FLOOR {
        return BridgeSchedule {
            a_t: if sigma >= sigma_end * 0.99 { 1.0 } else { 0.0 },
            b_t: if sigma <= 1e-6 { 1.0 } else { 0.0 },
            sigma_t: 0.0,
        };
    }

    // (1 - e^{-L_t}) / (1 - e^{-L_T})
    let tail_ratio = (-log_t).exp_m1() / (-log_end).exp_m1();
    let rho_ratio = (log_t - log_end).exp() * tail_ratio;
    let rho_bar_ratio = (1.0 - rho_ratio).max(0.0);

    BridgeSchedule {
        a_t: (0.5 * (log_t - log_end)).exp() * tail_ratio,
        b_t: (-0.5 * log_t).exp() * rho_bar_ratio,
        // α_t ρ_t = √(1 - e^{-L_t})
        sigma_t: (-(-log_t).exp_m1() * rho_bar_ratio).max(0.0).sqrt(),
    }
}
