//! Parameter transforms between the unconstrained optimiser scale and the
//! natural scale.

use num_traits::Float;

use super::cast;

/// Inverse logit, `1 / (1 + exp(-x))`.
#[inline]
pub fn invlogit<T: Float>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

/// Logit, `ln(p / (1 - p))`.
#[inline]
pub fn logit<T: Float>(p: T) -> T {
    (p / (T::one() - p)).ln()
}

/// Beverton-Holt steepness in (0.2, 1) from an unconstrained value.
///
/// ```text
/// h = 0.2 + 0.8 · invlogit(x)
/// ```
#[inline]
pub fn steepness_bh<T: Float>(x: T) -> T {
    cast::<T>(0.2) + cast::<T>(0.8) * invlogit(x)
}

/// Ricker steepness in (0.2, ∞) from an unconstrained value.
///
/// ```text
/// h = 0.2 + exp(x)
/// ```
#[inline]
pub fn steepness_ricker<T: Float>(x: T) -> T {
    cast::<T>(0.2) + x.exp()
}

/// Unconstrained value for a Beverton-Holt steepness (inverse of [`steepness_bh`]).
#[inline]
pub fn steepness_bh_inverse(h: f64) -> f64 {
    logit((h - 0.2) / 0.8)
}
