//! Error types
//!
//! Matching itself never fails: an empty candidate list or a weak best score
//! is reported as "no match". Only malformed configuration and exporters that
//! go through a writer return errors.

use thiserror::Error;

use crate::target::MatchStrategy;

/// Errors raised while building matchers or registering targets
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Threshold is NaN or outside its allowed range
    #[error("invalid fuzzy threshold {value}: expected a value in {range}")]
    InvalidThreshold { value: f64, range: &'static str },

    /// A similarity-based strategy was configured without a threshold
    #[error("strategy '{0}' requires a fuzzy threshold")]
    MissingThreshold(MatchStrategy),

    /// Target weight outside [0, 10]
    #[error("invalid target weight {0}: expected a value in [0, 10]")]
    InvalidWeight(f64),

    /// Minimum score outside [0, 1]
    #[error("invalid minimum score {0}: expected a value in [0, 1]")]
    InvalidMinScore(f64),

    /// Extraction pattern failed to compile
    #[error("invalid regex pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// Strategy not offered by this matcher
    #[error("strategy '{0}' is not supported here")]
    UnsupportedStrategy(MatchStrategy),

    /// Sound rule with an empty pattern
    #[error("invalid sound rule: {0}")]
    InvalidRule(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while exporting results
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer error
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Buffer flush error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer produced bytes that are not UTF-8
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON (de)serialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Check a similarity threshold. Similarity-gated matchers require (0, 1].
pub(crate) fn check_threshold(value: f64) -> ConfigResult<f64> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidThreshold {
            value,
            range: "(0, 1]",
        })
    }
}
