//! Survivorship and catch equations for age-structured models.

use stock_core::traits::Float;

/// Unfished survivorship at age, with the last age a plus group.
///
/// # Mathematical Definition
/// ```text
/// l_0 = 1
/// l_a = l_{a-1} · exp(-M_{a-1})
/// l_A = l_{A-1} · exp(-M_{A-1}) / (1 - exp(-M_A))     (plus group)
/// ```
pub fn survivorship(m: &[f64]) -> Vec<f64> {
    let n_age = m.len();
    let mut l = Vec::with_capacity(n_age);
    for a in 0..n_age {
        let la = if a == 0 {
            1.0
        } else {
            l[a - 1] * (-m[a - 1]).exp()
        };
        l.push(la);
    }
    if let Some(last) = l.last_mut() {
        *last /= 1.0 - (-m[n_age - 1]).exp();
    }
    l
}

/// Unfished spawning biomass per recruit, `φ0 = Σ_a l_a · w_a · mat_a`.
pub fn spawners_per_recruit(l: &[f64], weight: &[f64], mat: &[f64]) -> f64 {
    l.iter()
        .zip(weight)
        .zip(mat)
        .map(|((l, w), m)| l * w * m)
        .sum()
}

/// Baranov catch in numbers, `F/Z · N · (1 - exp(-Z))`.
#[inline]
pub fn baranov_catch<T: Float>(f: T, z: T, n: T) -> T {
    f / z * n * (T::one() - (-z).exp())
}

/// Survive numbers at age through one year of mortality `z`.
///
/// Age 0 of the result is left at zero for the caller to fill with
/// recruitment; the last age accumulates the plus group.
pub fn advance_ages<T: Float>(n: &[T], z: &[T]) -> Vec<T> {
    let n_age = n.len();
    let mut next = vec![T::zero(); n_age];
    for a in 0..n_age {
        let survivors = n[a] * (-z[a]).exp();
        let to = (a + 1).min(n_age - 1);
        next[to] = next[to] + survivors;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plus_group_sums_to_geometric_series() {
        let m = 0.2_f64;
        let l = survivorship(&[m; 5]);
        assert_eq!(l[0], 1.0);
        assert_relative_eq!(l[1], (-m).exp(), epsilon = 1e-12);
        // Total lifetime survivorship equals 1 / (1 - e^-M)
        let total: f64 = l.iter().sum();
        assert_relative_eq!(total, 1.0 / (1.0 - (-m).exp()), epsilon = 1e-10);
    }

    #[test]
    fn test_spawners_per_recruit() {
        let phi0 = spawners_per_recruit(&[1.0, 0.5], &[2.0, 4.0], &[0.0, 1.0]);
        assert_relative_eq!(phi0, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_advance_ages_plus_group() {
        let z = [0.0_f64; 3];
        let next = advance_ages(&[10.0, 5.0, 2.0], &z);
        assert_eq!(next, vec![0.0, 10.0, 7.0]);
    }

    #[test]
    fn test_baranov_small_f() {
        // With M = 0 catch is N(1 - e^-F)
        let c = baranov_catch(0.3_f64, 0.3, 1000.0);
        assert_relative_eq!(c, 1000.0 * (1.0 - (-0.3_f64).exp()), epsilon = 1e-9);
    }
}
