//! Logistic selectivity at age.

use stock_core::math::cast;
use stock_core::traits::Float;

/// `ln 19`: selectivity is 0.5 at `a50` and 0.95 at `a95`.
const LN_19: f64 = 2.944_438_979_166_440_5;

/// Logistic selectivity for ages `1..=n_age`.
///
/// `vul_par = [ln a50, ln(a95 - a50)]`, so any real pair gives ordered,
/// positive selectivity ages.
///
/// # Mathematical Definition
/// ```text
/// v_a = 1 / (1 + exp(-ln 19 · (a - a50) / (a95 - a50)))
/// ```
///
/// # Examples
/// ```
/// use stock_models::dynamics::logistic_selectivity;
///
/// let v = logistic_selectivity(&[3.0_f64.ln(), 2.0_f64.ln()], 10);
/// assert!((v[2] - 0.5).abs() < 1e-12);   // age 3
/// assert!((v[4] - 0.95).abs() < 1e-12);  // age 5
/// ```
pub fn logistic_selectivity<T: Float>(vul_par: &[T], n_age: usize) -> Vec<T> {
    let a50 = vul_par[0].exp();
    let width = vul_par[1].exp();
    let slope = cast::<T>(LN_19) / width;
    (1..=n_age)
        .map(|age| {
            let a = cast::<T>(age as f64);
            T::one() / (T::one() + (-slope * (a - a50)).exp())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_monotone_increasing() {
        let v = logistic_selectivity(&[1.0_f64, 0.5], 12);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
        assert!(v.iter().all(|&x| x > 0.0 && x < 1.0));
    }

    #[test]
    fn test_a50_a95() {
        let v = logistic_selectivity(&[4.0_f64.ln(), 3.0_f64.ln()], 8);
        assert_relative_eq!(v[3], 0.5, epsilon = 1e-12);
        assert_relative_eq!(v[6], 0.95, epsilon = 1e-12);
    }
}
