// src/config.rs
//! Configuration for both demos
//!
//! A configuration is created with defaults, mutated one named option at a
//! time through [`SdeConfig::update`] / [`BridgeConfig::update`], and read
//! wholesale by the simulators. Option names follow the UI keys (`steps`,
//! `T`, `xRange`, `sdeType`, ...). An unrecognised name is rejected and leaves
//! the configuration untouched; an unrecognised *selector value* falls back to
//! that selector's default with a warning.
//!
//! The time increment is derived, never stored: `dt() = T / steps`.

use crate::distributions::{EndpointDistribution, InitialDistribution};
use crate::error::{validation::*, SdeError, SdeResult};
use crate::models::bridge::BridgeType;
use crate::models::forward_sde::SdeType;
use crate::rng::NoiseKind;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

bitflags! {
    /// Which overlays the consumer wants; deterministic overlays are skipped
    /// when their flag is off
    ///
    /// Only `ODE_PATHS` and `MEAN_PATH` gate computation. `LEGEND`, `HEATMAP`
    /// and `SDE_PATHS` are carried through to the result for the renderer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Layers: u32 {
        const LEGEND    = 1 << 0;
        const HEATMAP   = 1 << 1;
        const SDE_PATHS = 1 << 2;
        const ODE_PATHS = 1 << 3;
        const MEAN_PATH = 1 << 4;
    }
}

/// A single option value as supplied by a UI control or CLI override
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Int(i64),
    Real(f64),
    Range(f64, f64),
    Text(String),
    Flag(bool),
}

impl OptionValue {
    /// Parse a CLI-style literal: `true`, `12`, `0.5`, `-4,4`, otherwise text
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "true" => return OptionValue::Flag(true),
            "false" => return OptionValue::Flag(false),
            _ => {}
        }
        if let Some((lo, hi)) = raw.split_once(',') {
            if let (Ok(lo), Ok(hi)) = (lo.trim().parse::<f64>(), hi.trim().parse::<f64>()) {
                return OptionValue::Range(lo, hi);
            }
        }
        if let Ok(n) = raw.parse::<i64>() {
            return OptionValue::Int(n);
        }
        if let Ok(r) = raw.parse::<f64>() {
            return OptionValue::Real(r);
        }
        OptionValue::Text(raw.to_string())
    }

    fn as_count(&self, key: &str) -> SdeResult<usize> {
        match *self {
            OptionValue::Int(n) if n >= 0 => Ok(n as usize),
            _ => Err(invalid_value(key, "a non-negative integer")),
        }
    }

    fn as_seed(&self, key: &str) -> SdeResult<u64> {
        match *self {
            OptionValue::Int(n) if n >= 0 => Ok(n as u64),
            _ => Err(invalid_value(key, "a non-negative integer seed")),
        }
    }

    fn as_real(&self, key: &str) -> SdeResult<f64> {
        match *self {
            OptionValue::Real(r) => Ok(r),
            OptionValue::Int(n) => Ok(n as f64),
            _ => Err(invalid_value(key, "a number")),
        }
    }

    fn as_range(&self, key: &str) -> SdeResult<(f64, f64)> {
        match *self {
            OptionValue::Range(lo, hi) => Ok((lo, hi)),
            _ => Err(invalid_value(key, "a range 'lo,hi'")),
        }
    }

    fn as_text(&self, key: &str) -> SdeResult<&str> {
        match self {
            OptionValue::Text(s) => Ok(s),
            _ => Err(invalid_value(key, "a selector name")),
        }
    }

    fn as_flag(&self, key: &str) -> SdeResult<bool> {
        match *self {
            OptionValue::Flag(b) => Ok(b),
            _ => Err(invalid_value(key, "true or false")),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Real(value)
    }
}

impl From<usize> for OptionValue {
    fn from(value: usize) -> Self {
        OptionValue::Int(value as i64)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<(f64, f64)> for OptionValue {
    fn from(value: (f64, f64)) -> Self {
        OptionValue::Range(value.0, value.1)
    }
}

fn invalid_value(key: &str, expected: &str) -> SdeError {
    SdeError::InvalidOptionValue {
        key: key.to_string(),
        expected: expected.to_string(),
    }
}

fn read_only_dt() -> SdeError {
    SdeError::InvalidConfiguration {
        field: "dt".to_string(),
        reason: "derived as T / steps; set 'steps' or 'T' instead".to_string(),
    }
}

fn noise_or_default(key: &str, raw: &str, default: NoiseKind) -> NoiseKind {
    NoiseKind::from_key(raw).unwrap_or_else(|| {
        warn!(option = key, selector = raw, "unknown noise kind, keeping default");
        default
    })
}

fn json_error(err: serde_json::Error) -> SdeError {
    SdeError::InvalidConfiguration {
        field: "json".to_string(),
        reason: err.to_string(),
    }
}

/// Toggle options shared by both demos, mapped onto [`Layers`]
fn layer_for_key(key: &str) -> Option<Layers> {
    match key {
        "showLegend" => Some(Layers::LEGEND),
        "showHeatmap" => Some(Layers::HEATMAP),
        "showSDE" => Some(Layers::SDE_PATHS),
        "showODE" => Some(Layers::ODE_PATHS),
        "showMeanPath" => Some(Layers::MEAN_PATH),
        _ => None,
    }
}

/// Forward SDE demo configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SdeConfig {
    pub steps: usize,
    pub paths: usize,
    #[serde(rename = "T")]
    pub t_max: f64,
    pub x_range: (f64, f64),
    pub sde_type: SdeType,
    pub initial_dist: InitialDistribution,
    pub noise: NoiseKind,
    pub seed: u64,
    pub layers: Layers,
}

impl Default for SdeConfig {
    fn default() -> Self {
        SdeConfig {
            steps: 200,
            paths: 20,
            t_max: 4.0,
            x_range: (-4.0, 4.0),
            sde_type: SdeType::Vp,
            initial_dist: InitialDistribution::Bimodal,
            noise: NoiseKind::SymmetricUniform,
            seed: 12345,
            layers: Layers::HEATMAP | Layers::SDE_PATHS | Layers::ODE_PATHS,
        }
    }
}

impl SdeConfig {
    /// Settable option names. Pure rendering keys such as `colorScheme` and
    /// `background` are not part of the set and return `UnknownOption`.
    pub const KEYS: [&'static str; 12] = [
        "steps",
        "paths",
        "T",
        "xRange",
        "sdeType",
        "initialDist",
        "noise",
        "seed",
        "showLegend",
        "showODE",
        "showSDE",
        "showHeatmap",
    ];

    /// Euler-Maruyama increment
    pub fn dt(&self) -> f64 {
        self.t_max / self.steps as f64
    }

    /// Set one named option
    ///
    /// # Errors
    ///
    /// `UnknownOption` for names outside [`Self::KEYS`], `InvalidOptionValue`
    /// for values of the wrong shape, `InvalidConfiguration` for `dt`. On
    /// error the configuration is unchanged.
    pub fn update(&mut self, key: &str, value: OptionValue) -> SdeResult<()> {
        match key {
            "steps" => self.steps = value.as_count(key)?,
            "paths" => self.paths = value.as_count(key)?,
            "T" => self.t_max = value.as_real(key)?,
            "xRange" => self.x_range = value.as_range(key)?,
            "sdeType" => self.sde_type = SdeType::from_key_or_default(value.as_text(key)?),
            "initialDist" => {
                self.initial_dist = InitialDistribution::from_key_or_default(value.as_text(key)?)
            }
            "noise" => self.noise = noise_or_default(key, value.as_text(key)?, self.noise),
            "seed" => self.seed = value.as_seed(key)?,
            "dt" => return Err(read_only_dt()),
            _ => match layer_for_key(key) {
                Some(layer) if Self::KEYS.contains(&key) => {
                    self.layers.set(layer, value.as_flag(key)?)
                }
                _ => {
                    return Err(SdeError::UnknownOption {
                        key: key.to_string(),
                    })
                }
            },
        }
        debug!(option = key, "sde configuration updated");
        Ok(())
    }

    pub fn validate(&self) -> SdeResult<()> {
        validate_steps(self.steps)?;
        validate_paths(self.paths)?;
        validate_positive("T", self.t_max)?;
        validate_finite("T", self.t_max)?;
        validate_range("xRange", self.x_range)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> SdeResult<Self> {
        let config: SdeConfig = serde_json::from_str(json).map_err(json_error)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> SdeResult<String> {
        serde_json::to_string_pretty(self).map_err(json_error)
    }
}

/// Diffusion bridge demo configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BridgeConfig {
    pub steps: usize,
    pub paths: usize,
    #[serde(rename = "T")]
    pub t_max: f64,
    pub x_range: (f64, f64),
    pub sigma_max: f64,
    pub source_dist: EndpointDistribution,
    pub target_dist: EndpointDistribution,
    pub source_center: f64,
    pub target_center: f64,
    pub source_spread: f64,
    pub target_spread: f64,
    pub model_type: BridgeType,
    pub noise: NoiseKind,
    pub seed: u64,
    /// Size of an independent pair set for the density estimate; `None`
    /// reuses the pairs that seeded the plotted paths
    pub kde_pairs: Option<usize>,
    pub layers: Layers,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            steps: 200,
            paths: 20,
            t_max: 1.0,
            x_range: (-4.0, 4.0),
            sigma_max: 0.8,
            source_dist: EndpointDistribution::Trimodal,
            target_dist: EndpointDistribution::Single,
            source_center: -2.0,
            target_center: 2.0,
            source_spread: 0.5,
            target_spread: 0.5,
            model_type: BridgeType::Dbim,
            noise: NoiseKind::BoxMuller,
            seed: 12345,
            kde_pairs: None,
            layers: Layers::HEATMAP | Layers::MEAN_PATH,
        }
    }
}

impl BridgeConfig {
    /// Settable option names; rendering keys are excluded as for [`SdeConfig::KEYS`]
    pub const KEYS: [&'static str; 18] = [
        "steps",
        "paths",
        "T",
        "xRange",
        "sigmaMax",
        "sourceDist",
        "targetDist",
        "sourceCenter",
        "targetCenter",
        "sourceSpread",
        "targetSpread",
        "modelType",
        "noise",
        "seed",
        "kdePairs",
        "showLegend",
        "showHeatmap",
        "showMeanPath",
    ];

    pub fn dt(&self) -> f64 {
        self.t_max / self.steps as f64
    }

    /// Set one named option; same error contract as [`SdeConfig::update`]
    ///
    /// `kdePairs = 0` switches back to reusing the path pairs.
    pub fn update(&mut self, key: &str, value: OptionValue) -> SdeResult<()> {
        match key {
            "steps" => self.steps = value.as_count(key)?,
            "paths" => self.paths = value.as_count(key)?,
            "T" => self.t_max = value.as_real(key)?,
            "xRange" => self.x_range = value.as_range(key)?,
            "sigmaMax" => self.sigma_max = value.as_real(key)?,
            "sourceDist" => {
                self.source_dist = EndpointDistribution::from_key_or_default(value.as_text(key)?)
            }
            "targetDist" => {
                self.target_dist = EndpointDistribution::from_key_or_default(value.as_text(key)?)
            }
            "sourceCenter" => self.source_center = value.as_real(key)?,
            "targetCenter" => self.target_center = value.as_real(key)?,
            "sourceSpread" => self.source_spread = value.as_real(key)?,
            "targetSpread" => self.target_spread = value.as_real(key)?,
            "modelType" => self.model_type = BridgeType::from_key_or_default(value.as_text(key)?),
            "noise" => self.noise = noise_or_default(key, value.as_text(key)?, self.noise),
            "seed" => self.seed = value.as_seed(key)?,
            "kdePairs" => {
                self.kde_pairs = match value.as_count(key)? {
                    0 => None,
                    n => Some(n),
                }
            }
            "dt" => return Err(read_only_dt()),
            _ => match layer_for_key(key) {
                Some(layer) if Self::KEYS.contains(&key) => {
                    self.layers.set(layer, value.as_flag(key)?)
                }
                _ => {
                    return Err(SdeError::UnknownOption {
                        key: key.to_string(),
                    })
                }
            },
        }
        debug!(option = key, "bridge configuration updated");
        Ok(())
    }

    pub fn validate(&self) -> SdeResult<()> {
        validate_steps(self.steps)?;
        validate_paths(self.paths)?;
        validate_positive("T", self.t_max)?;
        validate_finite("T", self.t_max)?;
        validate_range("xRange", self.x_range)?;
        validate_non_negative("sigmaMax", self.sigma_max)?;
        validate_finite("sigmaMax", self.sigma_max)?;
        validate_finite("sourceCenter", self.source_center)?;
        validate_finite("targetCenter", self.target_center)?;
        validate_non_negative("sourceSpread", self.source_spread)?;
        validate_non_negative("targetSpread", self.target_spread)?;
        if let Some(pairs) = self.kde_pairs {
            validate_paths(pairs).map_err(|_| SdeError::InvalidConfiguration {
                field: "kdePairs".to_string(),
                reason: "must be between 1 and 100,000".to_string(),
            })?;
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> SdeResult<Self> {
        let config: BridgeConfig = serde_json::from_str(json).map_err(json_error)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> SdeResult<String> {
        serde_json::to_string_pretty(self).map_err(json_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SdeConfig::default().validate().is_ok());
        assert!(BridgeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_dt_follows_steps_and_horizon() {
        let mut cfg = SdeConfig::default();
        assert_relative_eq!(cfg.dt(), 4.0 / 200.0);

        cfg.update("steps", OptionValue::Int(100)).unwrap();
        assert_relative_eq!(cfg.dt(), 4.0 / 100.0);

        cfg.update("T", OptionValue::Real(2.0)).unwrap();
        assert_relative_eq!(cfg.dt(), 2.0 / 100.0);
    }

    #[test]
    fn test_dt_is_read_only() {
        let mut cfg = BridgeConfig::default();
        let before = cfg.clone();
        assert!(cfg.update("dt", OptionValue::Real(0.1)).is_err());
        assert_eq!(cfg, before);
    }

    #[test]
    fn test_unknown_option_leaves_config_unchanged() {
        let mut cfg = SdeConfig::default();
        let before = cfg.clone();
        let err = cfg.update("colorScheme", "plasma".into()).unwrap_err();
        assert_eq!(
            err,
            SdeError::UnknownOption {
                key: "colorScheme".to_string()
            }
        );
        assert_eq!(cfg, before);
        assert!(cfg.update("background", "#111".into()).is_err());
        assert_eq!(cfg, before);

        // toggle belonging to the other demo
        assert!(cfg.update("showMeanPath", true.into()).is_err());
        assert_eq!(cfg, before);
    }

    #[test]
    fn test_wrong_value_shape_is_rejected() {
        let mut cfg = SdeConfig::default();
        let before = cfg.clone();
        assert!(cfg.update("steps", OptionValue::Int(-3)).is_err());
        assert!(cfg.update("steps", OptionValue::Real(1.5)).is_err());
        assert!(cfg.update("xRange", OptionValue::Real(4.0)).is_err());
        assert!(cfg.update("showODE", "yes".into()).is_err());
        assert_eq!(cfg, before);
    }

    #[test]
    fn test_selector_updates_and_fallbacks() {
        let mut cfg = SdeConfig::default();
        cfg.update("sdeType", "ve".into()).unwrap();
        assert_eq!(cfg.sde_type, SdeType::Ve);
        cfg.update("sdeType", "cosine".into()).unwrap();
        assert_eq!(cfg.sde_type, SdeType::Vp);

        let mut bridge = BridgeConfig::default();
        bridge.update("modelType", "i2sb".into()).unwrap();
        assert_eq!(bridge.model_type, BridgeType::I2sb);
        bridge.update("modelType", "unknown".into()).unwrap();
        assert_eq!(bridge.model_type, BridgeType::Ddbm);
        bridge.update("targetDist", "gaussian".into()).unwrap();
        assert_eq!(bridge.target_dist, EndpointDistribution::Gaussian);
    }

    #[test]
    fn test_layer_toggles() {
        let mut cfg = SdeConfig::default();
        assert!(cfg.layers.contains(Layers::ODE_PATHS));
        cfg.update("showODE", false.into()).unwrap();
        assert!(!cfg.layers.contains(Layers::ODE_PATHS));
        cfg.update("showLegend", true.into()).unwrap();
        assert!(cfg.layers.contains(Layers::LEGEND));

        let mut bridge = BridgeConfig::default();
        bridge.update("showMeanPath", false.into()).unwrap();
        assert!(!bridge.layers.contains(Layers::MEAN_PATH));
    }

    #[test]
    fn test_kde_pairs_zero_means_shared() {
        let mut cfg = BridgeConfig::default();
        cfg.update("kdePairs", 500usize.into()).unwrap();
        assert_eq!(cfg.kde_pairs, Some(500));
        cfg.update("kdePairs", 0usize.into()).unwrap();
        assert_eq!(cfg.kde_pairs, None);
    }

    #[test]
    fn test_option_value_parse() {
        assert_eq!(OptionValue::parse("true"), OptionValue::Flag(true));
        assert_eq!(OptionValue::parse("100"), OptionValue::Int(100));
        assert_eq!(OptionValue::parse("0.8"), OptionValue::Real(0.8));
        assert_eq!(OptionValue::parse("-4, 4"), OptionValue::Range(-4.0, 4.0));
        assert_eq!(OptionValue::parse("ddbm"), OptionValue::Text("ddbm".to_string()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = BridgeConfig {
            sigma_max: -0.1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SdeConfig {
            x_range: (1.0, -1.0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SdeConfig {
            paths: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_uses_ui_keys() {
        let cfg = BridgeConfig {
            model_type: BridgeType::Turbo,
            ..Default::default()
        };
        let json = cfg.to_json().unwrap();
        assert!(json.contains("\"T\""));
        assert!(json.contains("\"sigmaMax\""));
        assert!(json.contains("\"turbo\""));
        assert_eq!(BridgeConfig::from_json(&json).unwrap(), cfg);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = SdeConfig::from_json(r#"{ "steps": 50, "sdeType": "subvp" }"#).unwrap();
        assert_eq!(cfg.steps, 50);
        assert_eq!(cfg.sde_type, SdeType::SubVp);
        assert_eq!(cfg.paths, 20);

        assert!(SdeConfig::from_json(r#"{ "colour": "red" }"#).is_err());
    }

    #[test]
    fn test_json_unknown_selector_falls_back() {
        let cfg = SdeConfig::from_json(r#"{ "sdeType": "cosine", "initialDist": "gamma" }"#).unwrap();
        assert_eq!(cfg.sde_type, SdeType::Vp);
        assert_eq!(cfg.initial_dist, InitialDistribution::Bimodal);

        let bridge = BridgeConfig::from_json(
            r#"{ "modelType": "sb", "sourceDist": "cauchy", "targetDist": "gaussian" }"#,
        )
        .unwrap();
        assert_eq!(bridge.model_type, BridgeType::Ddbm);
        assert_eq!(bridge.source_dist, EndpointDistribution::Single);
        assert_eq!(bridge.target_dist, EndpointDistribution::Gaussian);

        // a selector of the wrong JSON type is still an error
        assert!(SdeConfig::from_json(r#"{ "sdeType": 3 }"#).is_err());
    }
}
