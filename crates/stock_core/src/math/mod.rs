//! Differentiable numeric helpers for objective functions.
//!
//! This module provides:
//! - `density`: Log densities used by the likelihood components
//! - `penalty`: Smooth positive floor that keeps the objective differentiable
//! - `transform`: Parameter transforms (logit, steepness)
//!
//! Every function is generic over `T: Float` so it runs unchanged under
//! `f64` and the dual number types.

pub mod density;
pub mod penalty;
pub mod transform;

use num_traits::Float;

/// Lift an `f64` constant into the scalar type (zero derivative).
///
/// Falls back to `NaN` if the conversion is not representable, which
/// surfaces as a non-finite objective rather than a panic.
///
/// # Examples
/// ```
/// use stock_core::math::cast;
///
/// let half: f64 = cast(0.5);
/// assert_eq!(half, 0.5);
/// ```
#[inline]
pub fn cast<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_f64() {
        let x: f64 = cast(1.25);
        assert_eq!(x, 1.25);
    }

    #[cfg(feature = "num-dual-mode")]
    #[test]
    fn test_cast_dual_has_zero_derivative() {
        use crate::types::dual::DualNumber;

        let x: DualNumber = cast(3.0);
        assert_eq!(x.re, 3.0);
        assert_eq!(x.eps, 0.0);
    }
}
