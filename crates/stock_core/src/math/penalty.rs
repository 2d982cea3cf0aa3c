//! Differentiable floor with a quadratic penalty.
//!
//! Population models must keep biomass positive and harvest rates below one
//! without breaking differentiability. Hard `if` clamps would zero the
//! gradient; `posfun` instead bends the value smoothly and charges a
//! quadratic penalty that the optimiser sees.

use num_traits::Float;

use super::cast;

/// Quadratic penalty weight charged by [`posfun`].
pub const POSFUN_WEIGHT: f64 = 0.01;

/// Smooth positive floor.
///
/// # Mathematical Definition
/// ```text
/// posfun(x, ε) = x                    if x ≥ ε
///              = ε / (2 - x/ε)        otherwise, adding 0.01·(x - ε)² to `penalty`
/// ```
///
/// The result is continuous with continuous first derivative at `x = ε`
/// and always positive.
///
/// # Examples
/// ```
/// use stock_core::math::penalty::posfun;
///
/// let mut pen = 0.0_f64;
/// assert_eq!(posfun(0.5, 0.05, &mut pen), 0.5);
/// assert_eq!(pen, 0.0);
///
/// let floored = posfun(-1.0, 0.05, &mut pen);
/// assert!(floored > 0.0 && floored < 0.05);
/// assert!(pen > 0.0);
/// ```
#[inline]
pub fn posfun<T: Float>(x: T, eps: T, penalty: &mut T) -> T {
    if x >= eps {
        x
    } else {
        let d = x - eps;
        *penalty = *penalty + cast::<T>(POSFUN_WEIGHT) * d * d;
        eps / (cast::<T>(2.0) - x / eps)
    }
}
