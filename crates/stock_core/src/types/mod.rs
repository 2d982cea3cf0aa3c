//! Core numeric and error types.
//!
//! This module provides:
//! - `dual`: Dual number type aliases from num-dual for automatic differentiation (when `num-dual-mode` feature is enabled)
//! - `error`: Structured error types for bundle access and model evaluation
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`BundleError`], [`ModelError`] from `error`

#[cfg(feature = "num-dual-mode")]
pub mod dual;
pub mod error;

pub use error::{BundleError, ModelError};
