//! Derivatives of model objectives with respect to the parameter vector.
//!
//! The evaluators are generic over [`Float`](stock_core::traits::Float), so
//! gradients and Hessians come from evaluating them at
//! [`Dual64`](num_dual::Dual64) and [`HyperDual64`](num_dual::HyperDual64)
//! parameters. Finite differences are kept as an independent check.
//!
//! Parameters are addressed in flattened order, block by block in the order
//! they were inserted into the bundle.

mod config;
mod gradient;
mod verification;

pub use config::{DerivativeConfig, FiniteDifferenceScheme};
pub use gradient::{finite_difference_gradient, gradient, hessian, objective_value, value_and_gradient};
pub use verification::{verify_gradient, ComponentCheck, GradientCheck};
