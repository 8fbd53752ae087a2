//! Error handling for the gait sequence detection framework
//!
//! A single error type covers input validation, configuration and the
//! numeric collaborators used by the processing stages.

use core::fmt;

/// Result type alias for gait sequence detection operations
pub type GsdResult<T> = Result<T, GsdError>;

/// Error type for all framework operations
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GsdError {
    /// Malformed input recording (shape, emptiness, non-numeric values)
    InvalidInput {
        /// Description of the input problem
        reason: String,
    },

    /// Sampling rate that is not a finite positive number
    InvalidSamplingRate {
        /// What the rate was supplied for
        context: &'static str,
        /// Provided sampling rate
        rate: f64,
    },

    /// Detector or stage configuration rejected by validation
    InvalidConfiguration {
        /// Description of the configuration error
        message: String,
    },

    /// Failure inside a numeric processing stage
    ProcessingError {
        /// Description of the processing failure
        message: String,
    },

    /// Serialization/deserialization error
    SerializationError {
        /// Serialization error description
        message: String,
    },
}

impl GsdError {
    /// True for errors raised by input validation, before any processing.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            GsdError::InvalidInput { .. } | GsdError::InvalidSamplingRate { .. }
        )
    }
}

impl fmt::Display for GsdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GsdError::InvalidInput { reason } => {
                write!(f, "Invalid input: {}", reason)
            }
            GsdError::InvalidSamplingRate { context, rate } => {
                write!(f, "Invalid sampling rate for {}: {}Hz, must be a positive number",
                       context, rate)
            }
            GsdError::InvalidConfiguration { message } => {
                write!(f, "Invalid configuration: {}", message)
            }
            GsdError::ProcessingError { message } => {
                write!(f, "Processing error: {}", message)
            }
            GsdError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for GsdError {}

/// Validate that a sampling rate is finite and strictly positive
pub fn ensure_sampling_rate(context: &'static str, rate: f64) -> GsdResult<f64> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(GsdError::InvalidSamplingRate { context, rate })
    }
}

/// Convenience macro for creating input errors
#[macro_export]
macro_rules! input_error {
    ($($arg:tt)+) => {
        $crate::error::GsdError::InvalidInput {
            reason: format!($($arg)+),
        }
    };
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)+) => {
        $crate::error::GsdError::InvalidConfiguration {
            message: format!($($arg)+),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = GsdError::InvalidSamplingRate {
            context: "input recording",
            rate: -5.0,
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid sampling rate"));
        assert!(display.contains("input recording"));
        assert!(display.contains("-5"));
    }

    #[test]
    fn test_input_error_classification() {
        assert!(input_error!("expected {} columns", 3).is_invalid_input());
        assert!(GsdError::InvalidSamplingRate { context: "x", rate: 0.0 }.is_invalid_input());
        assert!(!config_error!("bad window").is_invalid_input());
        assert!(!GsdError::ProcessingError { message: "fft".into() }.is_invalid_input());
    }

    #[test]
    fn test_ensure_sampling_rate() {
        assert_eq!(ensure_sampling_rate("test", 40.0), Ok(40.0));
        assert!(ensure_sampling_rate("test", 0.0).is_err());
        assert!(ensure_sampling_rate("test", -5.0).is_err());
        assert!(ensure_sampling_rate("test", f64::NAN).is_err());
        assert!(ensure_sampling_rate("test", f64::INFINITY).is_err());
    }
}
