//! Error types for structured error handling.
//!
//! This module provides:
//! - `BundleError`: Errors from reading fields out of an input bundle
//! - `ModelError`: Errors raised by an objective function evaluation

use thiserror::Error;

/// Categorised input-bundle access errors.
///
/// Raised when an evaluator asks the bundle for a field it does not hold,
/// or holds under a different kind or shape than the evaluator requires.
///
/// # Examples
/// ```
/// use stock_core::types::BundleError;
///
/// let err = BundleError::MissingData("C_hist".to_string());
/// assert_eq!(format!("{}", err), "Missing data field: C_hist");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// Data field not present in the bundle.
    #[error("Missing data field: {0}")]
    MissingData(String),

    /// Parameter block not present in the bundle.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Data field present but of a different kind.
    #[error("Data field {name} has kind {found}, expected {expected}")]
    WrongKind {
        /// Field name
        name: String,
        /// Kind that was requested
        expected: &'static str,
        /// Kind actually stored
        found: &'static str,
    },

    /// Field length does not match what the evaluator requires.
    #[error("Field {name} has length {got}, expected {expected}")]
    LengthMismatch {
        /// Field name
        name: String,
        /// Required length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Matrix dimensions inconsistent with its value buffer or with the model.
    #[error("Matrix {name} has shape {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    ShapeMismatch {
        /// Field name
        name: String,
        /// Actual rows
        rows: usize,
        /// Actual columns
        cols: usize,
        /// Required rows
        expected_rows: usize,
        /// Required columns
        expected_cols: usize,
    },

    /// Flat parameter vector length differs from the parameter layout.
    #[error("Flat parameter vector has length {got}, layout requires {expected}")]
    FlatLength {
        /// Length required by the layout
        expected: usize,
        /// Length supplied
        got: usize,
    },
}

/// Errors raised while evaluating an objective function.
///
/// The dispatcher never creates these itself; it forwards whatever the
/// selected evaluator returns.
///
/// # Examples
/// ```
/// use stock_core::types::{BundleError, ModelError};
///
/// let err: ModelError = BundleError::MissingParameter("R0x".to_string()).into();
/// assert!(format!("{}", err).contains("R0x"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Required field missing or malformed.
    #[error(transparent)]
    Bundle(#[from] BundleError),

    /// Data present but semantically invalid for the model.
    #[error("{model} invalid data: {message}")]
    InvalidData {
        /// Model code ("DD", "SCA", ...)
        model: &'static str,
        /// Description of the problem
        message: String,
    },

    /// Selector text does not name a supported model (strict parsing only).
    #[error("Unrecognised model selector: {0}")]
    InvalidSelector(String),

    /// Evaluation produced a non-finite value where a finite one is required.
    #[error("Numerical failure: {0}")]
    Numerical(String),
}

impl ModelError {
    /// Create an invalid-data error for a model.
    pub fn invalid_data(model: &'static str, message: impl Into<String>) -> Self {
        ModelError::InvalidData {
            model,
            message: message.into(),
        }
    }

    /// Check if the error originates from bundle access.
    pub fn is_bundle_error(&self) -> bool {
        matches!(self, ModelError::Bundle(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_display() {
        let err = BundleError::MissingData("I_hist".to_string());
        assert_eq!(format!("{}", err), "Missing data field: I_hist");
    }

    #[test]
    fn test_wrong_kind_display() {
        let err = BundleError::WrongKind {
            name: "SR_type".to_string(),
            expected: "text",
            found: "scalar",
        };
        assert_eq!(
            format!("{}", err),
            "Data field SR_type has kind scalar, expected text"
        );
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = BundleError::ShapeMismatch {
            name: "CAA_hist".to_string(),
            rows: 3,
            cols: 4,
            expected_rows: 5,
            expected_cols: 4,
        };
        assert!(format!("{}", err).contains("3x4"));
        assert!(format!("{}", err).contains("5x4"));
    }

    #[test]
    fn test_model_error_from_bundle_error() {
        let err: ModelError = BundleError::MissingParameter("log_tau".to_string()).into();
        assert!(err.is_bundle_error());
        assert_eq!(format!("{}", err), "Missing parameter: log_tau");
    }

    #[test]
    fn test_invalid_data_display() {
        let err = ModelError::invalid_data("VPA", "fewer than three ages");
        assert_eq!(format!("{}", err), "VPA invalid data: fewer than three ages");
        assert!(!err.is_bundle_error());
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = ModelError::Numerical("objective is NaN".to_string());
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_clone_and_equality() {
        let err1 = BundleError::FlatLength {
            expected: 4,
            got: 3,
        };
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
