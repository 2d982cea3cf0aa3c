//! Core traits for generic numerics and objective functions.
//!
//! This module defines fundamental abstractions for:
//! - Generic floating-point operations (`Float` trait)
//! - Objective evaluation from an input bundle (`ObjectiveFunction` trait)
//!
//! All traits are designed for static dispatch (enum-based) so that the same
//! monomorphised code path serves plain and differentiated evaluation.
//!
//! ## Important
//! `ObjectiveFunction::objective` is generic over the scalar type, so the
//! trait is intentionally not object safe. Select implementations through
//! a closed enum, never through `Box<dyn Trait>`.

/// Generic floating-point trait for numeric computations.
///
/// This trait provides a unified interface for both standard floating-point
/// types (f64, f32) and automatic differentiation types (DualNumber,
/// HyperDualNumber).
///
/// # Examples
/// ```
/// use stock_core::traits::Float;
///
/// fn survival<T: Float>(m: T, f: T) -> T {
///     (-(m + f)).exp()
/// }
///
/// let s: f64 = survival(0.2, 0.1);
/// assert!((s - 0.740818).abs() < 1e-6);
/// ```
pub use num_traits::Float;

pub mod objective;

pub use objective::ObjectiveFunction;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_trait_with_f64() {
        fn generic_ln<T: Float>(x: T) -> T {
            x.ln()
        }

        assert_eq!(generic_ln(1.0_f64), 0.0);
    }

    #[test]
    fn test_float_trait_zero_is_additive_identity() {
        fn add_zero<T: Float>(x: T) -> T {
            x + T::zero()
        }

        assert_eq!(add_zero(3.5_f64), 3.5);
    }
}
