//! Error types and validation functions for independence testing.
//!
//! This module provides the error taxonomy shared by every engine in the crate:
//! configuration problems (estimator mode, lag bounds, subsample sizes), shape
//! problems (empty, ragged or mismatched series), invalid numeric input and
//! statistics that fail to come out finite.

use thiserror::Error;

/// Comprehensive error types for independence testing operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum IndependenceError {
    /// Invalid configuration value, either at construction or against the input length.
    #[error("Configuration error in {parameter}: {message}")]
    ConfigurationError {
        /// Name of the offending configuration field
        parameter: String,
        /// Human-readable constraint that was violated
        message: String,
    },

    /// Mismatched or degenerate input series shapes.
    #[error("Dimension error: {reason}")]
    DimensionError {
        /// Description of the shape problem
        reason: String,
    },

    /// Input series contains a value that cannot enter a distance computation.
    #[error("Invalid data in {series}: non-finite value {value} at index {index}")]
    InvalidData {
        /// Name of the series ("X", "Y", ...)
        series: String,
        /// Flat index of the offending value
        index: usize,
        /// The offending value
        value: f64,
    },

    /// A computed statistic is not finite.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },
}

/// Coarse classification of [`IndependenceError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid `which_test`, `max_lag`, replication factor or subsample size
    Configuration,
    /// Empty, ragged or mismatched series
    Dimension,
    /// Non-finite input values
    Data,
    /// Non-finite computed statistics
    Numerical,
}

impl IndependenceError {
    /// Build a configuration error for `parameter`.
    pub fn configuration(parameter: &str, message: impl Into<String>) -> Self {
        IndependenceError::ConfigurationError {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }

    /// Build a dimension error.
    pub fn dimension(reason: impl Into<String>) -> Self {
        IndependenceError::DimensionError {
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndependenceError::ConfigurationError { .. } => ErrorKind::Configuration,
            IndependenceError::DimensionError { .. } => ErrorKind::Dimension,
            IndependenceError::InvalidData { .. } => ErrorKind::Data,
            IndependenceError::NumericalError { .. } => ErrorKind::Numerical,
        }
    }

    /// True for configuration failures.
    pub fn is_configuration_error(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// True for shape failures.
    pub fn is_dimension_error(&self) -> bool {
        self.kind() == ErrorKind::Dimension
    }
}

/// Result type for independence testing operations.
///
/// This is a convenience type alias for operations that may fail with [`IndependenceError`].
pub type IndependenceResult<T> = Result<T, IndependenceError>;

/// Validates that all values in a slice are finite.
///
/// Returns immediately on the first non-finite value.
///
/// # Arguments
/// * `data` - Values to validate
/// * `name` - Series name for error reporting
///
/// # Returns
/// * `Ok(())` if all values are finite
/// * `Err(IndependenceError::InvalidData)` naming the first offending index
///
/// # Example
/// ```rust
/// use timeseries_independence::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0, 3.0], "X").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN, 3.0], "X").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> IndependenceResult<()> {
    if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(IndependenceError::InvalidData {
            series: name.to_string(),
            index,
            value,
        });
    }
    Ok(())
}

/// Validates that a computed statistic is finite.
///
/// # Arguments
/// * `value` - Statistic to validate
/// * `name` - Statistic name for error reporting
/// * `operation` - Computation that produced it
///
/// # Returns
/// * `Ok(value)` if it is finite
/// * `Err(IndependenceError::NumericalError)` otherwise
pub fn validate_finite_statistic(value: f64, name: &str, operation: &str) -> IndependenceResult<f64> {
    if value.is_finite() {
        return Ok(value);
    }
    Err(IndependenceError::NumericalError {
        reason: format!("{} is not finite: {}", name, value),
        operation: Some(operation.to_string()),
    })
}

/// Validates that a count-like parameter is strictly positive.
///
/// # Example
/// ```rust
/// use timeseries_independence::errors::validate_positive;
///
/// assert!(validate_positive(1000, "replication_factor").is_ok());
/// assert!(validate_positive(0, "replication_factor").is_err());
/// ```
pub fn validate_positive(value: usize, name: &str) -> IndependenceResult<()> {
    if value == 0 {
        return Err(IndependenceError::configuration(
            name,
            format!("{} must be a positive integer, got 0", name),
        ));
    }
    Ok(())
}
