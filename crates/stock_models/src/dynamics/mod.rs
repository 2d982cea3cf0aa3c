//! Population-dynamics building blocks shared by the evaluators.
//!
//! This module provides:
//! - `stock_recruit`: Beverton-Holt and Ricker relationships from steepness
//! - `selectivity`: Logistic selectivity at age
//! - `index`: Lognormal index likelihood with analytic catchability
//! - `recruitment`: Recruitment-deviation likelihood and bias correction
//! - `survival`: Unfished survivorship, spawners per recruit, Baranov catch
//!
//! Everything here is generic over `T: Float` and free of state, so the
//! evaluators stay pure functions of their bundle.

pub mod index;
pub mod recruitment;
pub mod selectivity;
pub mod stock_recruit;
pub mod survival;

pub use index::{fit_index, IndexFit, IndexType};
pub use recruitment::{bias_corrected, rec_dev_nll};
pub use selectivity::logistic_selectivity;
pub use stock_recruit::{SRType, StockRecruit};
pub use survival::{advance_ages, baranov_catch, spawners_per_recruit, survivorship};

use stock_core::bundle::{DataSet, DataValue};
use stock_core::traits::Float;
use stock_core::types::{BundleError, ModelError};

/// Read an at-age schedule that may be given as a scalar or a vector.
///
/// A scalar is repeated over all `n_age` ages; a vector must have length
/// `n_age`.
pub fn age_schedule(data: &DataSet, name: &str, n_age: usize) -> Result<Vec<f64>, BundleError> {
    match data.get(name) {
        Some(DataValue::Scalar(_)) | Some(DataValue::Integer(_)) => {
            Ok(vec![data.scalar(name)?; n_age])
        }
        _ => data.vector_len(name, n_age).map(<[f64]>::to_vec),
    }
}

/// Read natural mortality at age for a model with a plus group.
///
/// The plus-group survivorship divides by `1 - exp(-M)`, so every age must
/// have `M > 0`.
pub fn natural_mortality(
    data: &DataSet,
    n_age: usize,
    model: &'static str,
) -> Result<Vec<f64>, ModelError> {
    let m = age_schedule(data, "M", n_age)?;
    if let Some(bad) = m.iter().find(|&&x| !(x > 0.0 && x.is_finite())) {
        return Err(ModelError::invalid_data(
            model,
            format!("M must be positive, got {}", bad),
        ));
    }
    Ok(m)
}

/// `Σ x_i · y_i`
pub fn sum_product<T: Float>(x: &[T], y: &[T]) -> T {
    x.iter().zip(y).fold(T::zero(), |acc, (&a, &b)| acc + a * b)
}

/// `Σ x_i · y_i · z_i`
pub fn sum_product3<T: Float>(x: &[T], y: &[T], z: &[T]) -> T {
    x.iter()
        .zip(y)
        .zip(z)
        .fold(T::zero(), |acc, ((&a, &b), &c)| acc + a * b * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_schedule_scalar_is_repeated() {
        let mut data = DataSet::new();
        data.insert("M", 0.3);
        assert_eq!(age_schedule(&data, "M", 4).unwrap(), vec![0.3; 4]);
    }

    #[test]
    fn test_age_schedule_vector_length_checked() {
        let mut data = DataSet::new();
        data.insert("weight", vec![0.1, 0.5, 1.0]);
        assert_eq!(age_schedule(&data, "weight", 3).unwrap().len(), 3);
        assert!(matches!(
            age_schedule(&data, "weight", 5),
            Err(BundleError::LengthMismatch { expected: 5, got: 3, .. })
        ));
    }

    #[test]
    fn test_natural_mortality_must_be_positive() {
        let mut data = DataSet::new();
        data.insert("M", vec![0.2, 0.2, 0.0]);
        assert!(matches!(
            natural_mortality(&data, 3, "SCA"),
            Err(ModelError::InvalidData { model: "SCA", .. })
        ));

        data.insert("M", 0.25);
        assert_eq!(natural_mortality(&data, 3, "SCA").unwrap(), vec![0.25; 3]);
    }

    #[test]
    fn test_sum_products() {
        assert_eq!(sum_product(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
        assert_eq!(sum_product3(&[1.0, 2.0], &[3.0, 4.0], &[0.5, 0.25]), 3.5);
    }

    #[test]
    fn test_age_schedule_missing() {
        let data = DataSet::new();
        assert_eq!(
            age_schedule(&data, "mat", 3),
            Err(BundleError::MissingData("mat".to_string()))
        );
    }
}
