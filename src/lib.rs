//! # sde-bridge-viz: Simulation Core for Diffusion Visualizations
//!
//! Generates the data behind two interactive views:
//!
//! - **Forward SDE demo**: Euler-Maruyama paths of the VP, VE and Sub-VP
//!   processes, their probability-flow ODE trajectories, and the exact
//!   marginal density `p_t(x)` as a heatmap
//! - **Diffusion bridge demo**: DDBM, I2SB, DDIB, DBIM and Turbo
//!   interpolations between a source and a target distribution, with a
//!   Monte Carlo kernel density estimate of the bridge marginals
//!
//! ## Quick Start
//!
//! ```rust
//! use sde_bridge_viz::config::{OptionValue, SdeConfig};
//! use sde_bridge_viz::mc::sde_engine::generate_sde;
//!
//! let mut config = SdeConfig::default();
//! config.update("steps", OptionValue::Int(50)).expect("known option");
//! config.update("sdeType", "subvp".into()).expect("known option");
//!
//! let result = generate_sde(&config).expect("valid configuration");
//! assert_eq!(result.t.len(), 50);
//! assert_eq!(result.density.dim(), (100, 50));
//! ```
//!
//! ## Mathematical Foundation
//!
//! All three forward processes are linear, `dx = -½β x dt + g(t) dW`, so the
//! marginal is the data distribution scaled by `μ(t)` and blurred by a
//! Gaussian of variance `v(t)`. Bridges have closed-form marginals
//! `z_t = a_t x + b_t y + σ_t ε` and are sampled pointwise rather than
//! integrated.

// Module declarations
pub mod analytics;
pub mod config;
pub mod controller;
pub mod distributions;
pub mod error;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod output;
pub mod rng;
pub mod solvers;

// Re-export commonly used types for convenience
pub use config::{BridgeConfig, Layers, OptionValue, SdeConfig};
pub use error::{SdeError, SdeResult};
pub use mc::bridge_engine::{generate_bridge, BridgeSimulationResult, BridgeSimulator};
pub use mc::sde_engine::{generate_sde, SdeSimulationResult, SdeSimulator};
pub use mc::Simulator;
