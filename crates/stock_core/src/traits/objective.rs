//! Objective function trait shared by every population-dynamics model.
//!
//! An objective function reads observed data and current parameter values
//! from an [`InputBundle`], returns one scalar to be minimised, and may
//! record derived quantities in a [`Report`] for the reporting layer.
//!
//! # Static Dispatch Only
//!
//! ```
//! use stock_core::bundle::{InputBundle, Report};
//! use stock_core::traits::{Float, ObjectiveFunction};
//! use stock_core::types::ModelError;
//!
//! struct Quadratic;
//!
//! impl ObjectiveFunction for Quadratic {
//!     fn code() -> &'static str {
//!         "Q"
//!     }
//!
//!     fn objective<T: Float>(
//!         &self,
//!         bundle: &InputBundle<T>,
//!         report: &mut Report<T>,
//!     ) -> Result<T, ModelError> {
//!         let x = bundle.parameters().scalar("x")?;
//!         report.scalar("x", x);
//!         Ok(x * x)
//!     }
//! }
//!
//! let mut params = stock_core::bundle::ParameterSet::new();
//! params.insert("x", vec![3.0_f64]);
//! let bundle = InputBundle::new(Default::default(), params);
//! let mut report = Report::new();
//! assert_eq!(Quadratic.objective(&bundle, &mut report).unwrap(), 9.0);
//! ```

use crate::bundle::{InputBundle, Report};
use crate::traits::Float;
use crate::types::ModelError;

/// Capability: produce a scalar objective from an input bundle.
///
/// # Invariants
/// - Pure in `(bundle, T)`: no hidden mutable state, identical inputs give
///   bit-identical results.
/// - Constraint violations are expressed as differentiable penalties added
///   to the objective, not as errors.
/// - Missing or malformed fields are reported through [`ModelError`].
pub trait ObjectiveFunction {
    /// Short model code used by selectors and reports ("DD", "SP", ...).
    fn code() -> &'static str;

    /// Evaluate the objective for the given bundle.
    ///
    /// # Arguments
    /// * `bundle` - Observed data and current parameter values
    /// * `report` - Side channel for derived quantities
    fn objective<T: Float>(
        &self,
        bundle: &InputBundle<T>,
        report: &mut Report<T>,
    ) -> Result<T, ModelError>;
}
