//! Error handling for StencilMill
//!
//! Provides the error taxonomy shared by every layer of the pipeline:
//! - Configuration errors (bad or missing parameters)
//! - Input errors (images that cannot be turned into a grid)
//! - Internal invariant failures (grid accesses the geometry promised were in bounds)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for StencilMill
///
/// None of these are recoverable mid-run: a failed run produces no placement list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A configuration parameter is missing, unrecognized or out of range
    #[error("Invalid configuration for '{parameter}': {reason}")]
    InvalidConfiguration {
        /// The offending parameter name.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The source image cannot be turned into a working grid
    #[error("Malformed input: {reason}")]
    MalformedInput {
        /// Description of the input problem.
        reason: String,
    },

    /// A grid access fell outside the bounds computed for it
    #[error("Internal invariant violated: {reason}")]
    InvariantViolation {
        /// Description of the violated invariant.
        reason: String,
    },
}

impl Error {
    /// Create a configuration error for the named parameter
    pub fn invalid_config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create an input error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Create an invariant failure
    pub fn invariant(reason: impl Into<String>) -> Self {
        Error::InvariantViolation {
            reason: reason.into(),
        }
    }

    /// Name of the offending parameter, for configuration errors
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Error::InvalidConfiguration { parameter, .. } => Some(parameter),
            _ => None,
        }
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Require a strictly positive, finite value
pub fn ensure_positive(parameter: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::invalid_config(
            parameter,
            format!("must be a positive number, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_config("tool_diameter", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'tool_diameter': must be positive"
        );

        let err = Error::malformed("image has zero width");
        assert_eq!(err.to_string(), "Malformed input: image has zero width");
    }

    #[test]
    fn test_parameter_name() {
        let err = Error::invalid_config("px_size", "must be positive");
        assert_eq!(err.parameter(), Some("px_size"));
        assert_eq!(Error::invariant("oob").parameter(), None);
    }

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("px_size", 0.1), Ok(0.1));
        assert!(ensure_positive("px_size", 0.0).is_err());
        assert!(ensure_positive("px_size", -1.0).is_err());
        assert!(ensure_positive("px_size", f64::NAN).is_err());
    }
}
