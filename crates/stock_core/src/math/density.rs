//! Log densities for likelihood components.
//!
//! All functions return log densities; objective functions accumulate their
//! negatives. Observations are plain `f64` where they come from data, and
//! `T` where they may carry derivatives (e.g. recruitment deviations).

use num_traits::Float;

use super::cast;

/// `0.5 * ln(2π)`
const HALF_LN_2PI: f64 = 0.918_938_533_204_672_8;

/// Normal log density.
///
/// # Mathematical Definition
/// ```text
/// ln N(x; μ, σ) = -ln σ - ½ ln 2π - ½ ((x - μ) / σ)²
/// ```
///
/// # Examples
/// ```
/// use stock_core::math::density::dnorm;
///
/// let ll = dnorm(1.0_f64, 0.0, 1.0);
/// assert!((ll - (-1.418_938_533)).abs() < 1e-8);
/// ```
#[inline]
pub fn dnorm<T: Float>(x: T, mean: T, sd: T) -> T {
    let z = (x - mean) / sd;
    -sd.ln() - cast::<T>(HALF_LN_2PI) - cast::<T>(0.5) * z * z
}

/// Sum of normal log densities of observed `ln(obs)` around `ln(pred)`.
///
/// Observations that are `NaN` or non-positive are treated as missing.
/// The `-ln(obs)` Jacobian is omitted, as it does not depend on parameters.
///
/// # Returns
/// `(log_likelihood, n_observed)`
pub fn sum_dnorm_log<T: Float>(obs: &[f64], pred: &[T], sd: T) -> (T, usize) {
    let mut ll = T::zero();
    let mut n = 0;
    for (&o, &p) in obs.iter().zip(pred) {
        if o.is_finite() && o > 0.0 {
            ll = ll + dnorm(cast::<T>(o.ln()), p.ln(), sd);
            n += 1;
        }
    }
    (ll, n)
}

/// Multinomial log-likelihood kernel.
///
/// # Mathematical Definition
/// ```text
/// Σ_i  n · p_obs_i · ln(p_pred_i)
/// ```
///
/// `obs_prop` holds observed proportions (they need not sum to exactly one)
/// and `sample_size` the effective sample size `n`. Terms with a zero or
/// missing observed proportion contribute nothing. Constant factorial terms
/// are omitted.
pub fn dmultinom_kernel<T: Float>(obs_prop: &[f64], pred_prop: &[T], sample_size: f64) -> T {
    let mut ll = T::zero();
    if !(sample_size.is_finite() && sample_size > 0.0) {
        return ll;
    }
    let total: f64 = obs_prop.iter().filter(|p| p.is_finite()).sum();
    if total <= 0.0 {
        return ll;
    }
    for (&o, &p) in obs_prop.iter().zip(pred_prop) {
        if o.is_finite() && o > 0.0 {
            ll = ll + cast::<T>(sample_size * o / total) * p.ln();
        }
    }
    ll
}
