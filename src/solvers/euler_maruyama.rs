// src/solvers/euler_maruyama.rs
//! Euler-Maruyama Scheme for SDE Integration
//!
//! # Mathematical Framework
//!
//! For a general SDE:
//! ```text
//! dX_t = a(X_t, t) dt + b(X_t, t) dW_t
//! ```
//!
//! The Euler-Maruyama scheme provides the discretization:
//! ```text
//! X_{n+1} = X_n + a(X_n, t_n) Δt + b(X_n, t_n) ΔW_n
//! ```
//!
//! with `ΔW_n = √Δt · ξ_n`. For plotting, `ξ_n` only needs zero mean and unit
//! variance, so the draw is delegated to a [`NoiseKind`].
//!
//! # Convergence Properties
//!
//! - **Strong convergence**: Order 0.5 in step size
//! - **Weak convergence**: Order 1.0 in step size

use crate::models::model::SDEModel;
use crate::rng::NoiseKind;
use rand::Rng;

/// Euler-Maruyama numerical scheme for SDE integration
pub struct EulerMaruyama;

impl EulerMaruyama {
    /// Single Euler-Maruyama step
    ///
    /// # Parameters
    /// - `model`: SDE model providing drift and diffusion functions
    /// - `x`: Current state (modified in-place)
    /// - `t`: Current time
    /// - `dt`: Time step size
    /// - `noise`: Generator for the standardised increment
    /// - `rng`: Random number generator
    pub fn step<M: SDEModel, R: Rng + ?Sized>(
        model: &M,
        x: &mut f64,
        t: f64,
        dt: f64,
        noise: NoiseKind,
        rng: &mut R,
    ) {
        let dw = noise.draw(rng) * dt.sqrt();
        model.step_with_dw(x, t, dt, dw);
    }

    /// Trajectory of exactly `steps` points starting at `x0`
    ///
    /// Point `n` sits at time `n · dt`. `steps == 0` yields an empty path.
    pub fn integrate<M: SDEModel, R: Rng + ?Sized>(
        model: &M,
        x0: f64,
        dt: f64,
        steps: usize,
        noise: NoiseKind,
        rng: &mut R,
    ) -> Vec<f64> {
        let mut path = Vec::with_capacity(steps);
        if steps == 0 {
            return path;
        }
        path.push(x0);

        let mut x = x0;
        for n in 1..steps {
            let t = (n - 1) as f64 * dt;
            Self::step(model, &mut x, t, dt, noise, rng);
            path.push(x);
        }
        path
    }
}
