//! Configuration error types and validation traits.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A threshold was outside its allowed range.
    #[error("threshold '{name}' must be {expected}, got {actual}")]
    InvalidThreshold {
        /// Name of the threshold.
        name: &'static str,
        /// Description of the allowed range.
        expected: &'static str,
        /// The value supplied.
        actual: f64,
    },

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// A trait for validating configuration parameters.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Validates that a threshold is finite and strictly positive.
    fn validate_positive(&self, name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidThreshold {
                name,
                expected: "a positive finite number",
                actual: value,
            })
        }
    }

    /// Validates that a ratio lies in `(0, 1]`.
    fn validate_unit_interval(&self, name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 && value <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidThreshold {
                name,
                expected: "in (0, 1]",
                actual: value,
            })
        }
    }
}
