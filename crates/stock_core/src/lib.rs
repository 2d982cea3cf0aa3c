//! # stock_core: Numeric Foundation for Stock-Assessment Objectives
//!
//! ## Layer 1 (Foundation) Role
//!
//! stock_core serves as the bottom layer of the workspace, providing:
//! - The generic numeric bound and dual number aliases (`traits`, `types::dual`)
//! - The model-agnostic input bundle: observed data, current parameters and
//!   the reporting side channel (`bundle`)
//! - Differentiable likelihood, penalty and transform helpers (`math`)
//! - Error types: `BundleError`, `ModelError` (`types::error`)
//! - The `ObjectiveFunction` trait implemented by every population model
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other stock_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - num-dual: Dual number types and automatic differentiation (optional)
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use stock_core::bundle::{DataSet, InputBundle, ParameterSet};
//! use stock_core::math::density::dnorm;
//!
//! let mut data = DataSet::new();
//! data.insert("C_hist", vec![10.0, 12.0, 9.0]);
//!
//! let mut params = ParameterSet::new();
//! params.insert("log_tau", vec![-1.0_f64]);
//!
//! let bundle = InputBundle::new(data, params);
//! assert_eq!(bundle.data().vector("C_hist").unwrap().len(), 3);
//!
//! let log_density = dnorm(0.0_f64, 0.0, 1.0);
//! assert!((log_density + 0.918_938_533).abs() < 1e-6);
//! ```
//!
//! ## Feature Flags
//!
//! - `num-dual-mode` (default): Dual number aliases for forward-mode AD
//! - `serde` (default): Serialisation for data sets, parameters and reports

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod bundle;
pub mod math;
pub mod traits;
pub mod types;
