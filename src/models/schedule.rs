// src/models/schedule.rs
//! Uniform entry point over both process families

use super::bridge::{BridgeSchedule, BridgeType};
use super::forward_sde::{SdeCoefficients, SdeType};

/// Any process whose coefficients can be looked up by time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    Sde(SdeType),
    Bridge(BridgeType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficients {
    Sde(SdeCoefficients),
    Bridge(BridgeSchedule),
}

impl ProcessKind {
    /// Resolve a selector against the SDE family first, then bridges
    ///
    /// `None` when the key names neither; callers pick their own default.
    pub fn from_key(key: &str) -> Option<Self> {
        SdeType::from_key(key)
            .map(ProcessKind::Sde)
            .or_else(|| BridgeType::from_key(key).map(ProcessKind::Bridge))
    }
}

/// Coefficients of `kind` at time `t ∈ [0, t_max]`
///
/// The forward SDEs are time-homogeneous in their parameters, so `t_max` and
/// `sigma_max` only affect bridge schedules.
pub fn schedule(kind: ProcessKind, t: f64, t_max: f64, sigma_max: f64) -> Coefficients {
    match kind {
        ProcessKind::Sde(sde) => Coefficients::Sde(sde.coefficients(t)),
        ProcessKind::Bridge(bridge) => {
            Coefficients::Bridge(bridge.schedule(t, t_max, sigma_max))
        }
    }
}
