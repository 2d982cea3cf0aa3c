//! Recruitment deviations.

use stock_core::math::cast;
use stock_core::math::density::dnorm;
use stock_core::traits::Float;

/// Negative log-likelihood of log recruitment deviations, `dev ~ N(0, σ)`.
pub fn rec_dev_nll<T: Float>(devs: &[T], sigma: T) -> T {
    devs.iter()
        .fold(T::zero(), |acc, &d| acc - dnorm(d, T::zero(), sigma))
}

/// Lognormal bias-corrected multiplier, `exp(dev - σ²/2)`.
///
/// Makes the expected multiplier one, so mean recruitment follows the
/// stock-recruit curve.
#[inline]
pub fn bias_corrected<T: Float>(dev: T, sigma: T) -> T {
    (dev - cast::<T>(0.5) * sigma * sigma).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_devs() {
        let nll = rec_dev_nll(&[0.0_f64; 4], 0.6);
        assert_relative_eq!(nll, -4.0 * dnorm(0.0, 0.0, 0.6), epsilon = 1e-12);
    }

    #[test]
    fn test_nll_increases_with_deviation() {
        assert!(rec_dev_nll(&[1.0_f64], 0.5) > rec_dev_nll(&[0.1_f64], 0.5));
    }

    #[test]
    fn test_bias_correction() {
        assert_relative_eq!(bias_corrected(0.0_f64, 0.4), (-0.08_f64).exp(), epsilon = 1e-12);
    }
}
