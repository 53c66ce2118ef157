// src/error.rs
use std::fmt;

/// Error types for the sde-bridge-viz library
#[derive(Debug, Clone, PartialEq)]
pub enum SdeError {
    /// Invalid parameter values
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Numerical instability in a computed result
    NumericalInstability { method: String, reason: String },

    /// Invalid configuration
    InvalidConfiguration { field: String, reason: String },

    /// Option name not recognised by the configuration store
    UnknownOption { key: String },

    /// Option recognised but the supplied value has the wrong shape
    InvalidOptionValue { key: String, expected: String },

    /// A regeneration was requested while another one is running
    GenerationInProgress,
}

impl fmt::Display for SdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdeError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            SdeError::NumericalInstability { method, reason } => {
                write!(f, "Numerical instability in {}: {}", method, reason)
            }
            SdeError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            SdeError::UnknownOption { key } => {
                write!(f, "Unknown configuration option '{}'", key)
            }
            SdeError::InvalidOptionValue { key, expected } => {
                write!(f, "Option '{}' expects {}", key, expected)
            }
            SdeError::GenerationInProgress => {
                write!(f, "A generation is already in progress")
            }
        }
    }
}

impl std::error::Error for SdeError {}

/// Result type alias for sde-bridge-viz operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> SdeResult<()> {
        if value <= 0.0 {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> SdeResult<()> {
        if value < 0.0 {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SdeResult<()> {
        if !value.is_finite() {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a spatial window `[lo, hi]`
    pub fn validate_range(name: &str, range: (f64, f64)) -> SdeResult<()> {
        validate_finite(name, range.0)?;
        validate_finite(name, range.1)?;
        if range.0 >= range.1 {
            Err(SdeError::InvalidConfiguration {
                field: name.to_string(),
                reason: format!("lower bound {} must be below upper bound {}", range.0, range.1),
            })
        } else {
            Ok(())
        }
    }

    /// Validate paths count
    pub fn validate_paths(paths: usize) -> SdeResult<()> {
        if paths == 0 {
            Err(SdeError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if paths > 100_000 {
            Err(SdeError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "exceeds maximum allowed (100,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate steps count
    ///
    /// Fewer than two steps is accepted and yields a degenerate time grid.
    pub fn validate_steps(steps: usize) -> SdeResult<()> {
        if steps > 100_000 {
            Err(SdeError::InvalidConfiguration {
                field: "steps".to_string(),
                reason: "exceeds maximum allowed (100,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
