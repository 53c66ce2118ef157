// src/rng.rs
//! Random Number Generation for Path Simulation
//!
//! # Reproducibility
//!
//! Every path owns its own `StdRng`, seeded as `base_seed + path_id`. Paths can
//! therefore be generated in any order (or in parallel) and a fixed seed always
//! reproduces the same trajectories and density estimates.
//!
//! # Normal Generators
//!
//! The visualizations only need noise that *looks* Gaussian, so several
//! generators with different cost/accuracy are available through [`NoiseKind`]:
//!
//! ```text
//! BoxMuller       Z = √(-2 ln U₁) · cos(2π U₂)
//! CentralLimit    Z = Σᵢ₌₁¹² Uᵢ − 6
//! SymmetricUniform Z = (U − ½) · 2√3        (unit variance, bounded support)
//! Exact           rand_distr::StandardNormal (ziggurat)
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Open01, StandardNormal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Per-path RNG factory for reproducible simulations
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Create a standard RNG for a specific path
    pub fn create_std_rng(&self, path_id: u64) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(path_id))
    }

    /// Stream for draws that must not overlap any path stream
    ///
    /// Used for the independent KDE pair set; offsets by 2^32 so it cannot
    /// collide with realistic path counts.
    pub fn create_auxiliary_rng(&self, stream: u64) -> StdRng {
        StdRng::seed_from_u64(
            self.base_seed
                .wrapping_add(1u64 << 32)
                .wrapping_add(stream),
        )
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Exact standard normal draw
pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Uniform draw on the open interval (0, 1)
pub fn open_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    Open01.sample(rng)
}

/// Box-Muller transform, discarding the sine branch
pub fn box_muller<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = open_uniform(rng);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Irwin-Hall approximation: twelve uniforms minus six
pub fn central_limit_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0
}

/// Unit-variance uniform on [-√3, √3)
pub fn symmetric_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.gen::<f64>() - 0.5) * 2.0 * 3f64.sqrt()
}

/// Which generator produces the standard-normal-like noise term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoiseKind {
    BoxMuller,
    CentralLimit,
    SymmetricUniform,
    Exact,
}

impl NoiseKind {
    pub fn draw<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        match self {
            NoiseKind::BoxMuller => box_muller(rng),
            NoiseKind::CentralLimit => central_limit_normal(rng),
            NoiseKind::SymmetricUniform => symmetric_uniform(rng),
            NoiseKind::Exact => get_normal_draw(rng),
        }
    }

    /// Parse a selector, `None` if unrecognised
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "boxMuller" | "box_muller" => Some(NoiseKind::BoxMuller),
            "centralLimit" | "central_limit" | "clt" => Some(NoiseKind::CentralLimit),
            "symmetricUniform" | "symmetric_uniform" | "uniform" => {
                Some(NoiseKind::SymmetricUniform)
            }
            "exact" => Some(NoiseKind::Exact),
            _ => None,
        }
    }
}
