//! Objective values, gradients and Hessians at `f64` parameter values.
//!
//! Derivatives come from re-running the ordinary dispatch path with dual
//! numbers: each forward sweep seeds one parameter (gradient) or one pair
//! of parameters (Hessian). Sweeps are independent and run on the rayon
//! pool.

use num_dual::{Dual64, HyperDual64};
use rayon::prelude::*;
use stock_core::bundle::{InputBundle, Report};
use stock_core::types::ModelError;
use tracing::debug;

use super::config::{DerivativeConfig, FiniteDifferenceScheme};
use crate::models::{objective, ModelSelector};

fn finite(value: f64, what: &str) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::Numerical(format!("{} is {}", what, value)))
    }
}

/// Plain objective value.
///
/// # Errors
/// Evaluator errors, or `ModelError::Numerical` if the value is not finite.
pub fn objective_value(
    selector: &ModelSelector,
    bundle: &InputBundle<f64>,
) -> Result<f64, ModelError> {
    let value = objective(selector, bundle, &mut Report::new())?;
    finite(value, "objective")
}

/// Objective value and gradient with respect to every parameter, in
/// flattened parameter order.
pub fn value_and_gradient(
    selector: &ModelSelector,
    bundle: &InputBundle<f64>,
) -> Result<(f64, Vec<f64>), ModelError> {
    let n = bundle.parameters().len();
    debug!(%selector, n_params = n, "forward-mode gradient");

    let value = objective_value(selector, bundle)?;
    let gradient = (0..n)
        .into_par_iter()
        .map(|i| {
            let seeded = bundle.map_parameters(|j, x| Dual64::new(x, if i == j { 1.0 } else { 0.0 }));
            let y = objective(selector, &seeded, &mut Report::new())?;
            finite(y.eps, "gradient component")
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((value, gradient))
}

/// Gradient of the objective, in flattened parameter order.
///
/// # Examples
/// ```
/// use stock_models::demo;
/// use stock_models::derivatives::gradient;
/// use stock_models::models::{ModelKey, ModelSelector};
///
/// let bundle = demo::bundle_for(ModelKey::SurplusProduction).unwrap();
/// let g = gradient(&ModelSelector::parse("SP"), &bundle).unwrap();
/// assert_eq!(g.len(), bundle.parameters().len());
/// ```
pub fn gradient(
    selector: &ModelSelector,
    bundle: &InputBundle<f64>,
) -> Result<Vec<f64>, ModelError> {
    value_and_gradient(selector, bundle).map(|(_, g)| g)
}

/// Hessian of the objective as row vectors, in flattened parameter order.
///
/// One hyper-dual sweep per upper-triangular pair; the lower triangle is
/// filled by symmetry.
pub fn hessian(
    selector: &ModelSelector,
    bundle: &InputBundle<f64>,
) -> Result<Vec<Vec<f64>>, ModelError> {
    let n = bundle.parameters().len();
    debug!(%selector, n_params = n, "hyper-dual Hessian");

    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();
    let entries = pairs
        .par_iter()
        .map(|&(i, j)| {
            let seeded = bundle.map_parameters(|k, x| {
                HyperDual64::new(
                    x,
                    if k == i { 1.0 } else { 0.0 },
                    if k == j { 1.0 } else { 0.0 },
                    0.0,
                )
            });
            let y = objective(selector, &seeded, &mut Report::new())?;
            finite(y.eps1eps2, "Hessian entry").map(|v| (i, j, v))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut h = vec![vec![0.0; n]; n];
    for (i, j, v) in entries {
        h[i][j] = v;
        h[j][i] = v;
    }
    Ok(h)
}

/// Finite-difference gradient of the plain objective.
pub fn finite_difference_gradient(
    selector: &ModelSelector,
    bundle: &InputBundle<f64>,
    config: &DerivativeConfig,
) -> Result<Vec<f64>, ModelError> {
    let n = bundle.parameters().len();
    debug!(%selector, n_params = n, scheme = ?config.scheme, "finite-difference gradient");

    let base = match config.scheme {
        FiniteDifferenceScheme::Forward => Some(objective_value(selector, bundle)?),
        FiniteDifferenceScheme::Central => None,
    };
    let flat = bundle.parameters().flatten();
    (0..n)
        .into_par_iter()
        .map(|i| {
            let h = config.step_for(flat[i]);
            let bumped = |delta: f64| {
                let shifted = bundle.map_parameters(|j, x| if i == j { x + delta } else { x });
                objective_value(selector, &shifted)
            };
            match base {
                Some(f0) => Ok((bumped(h)? - f0) / h),
                None => Ok((bumped(h)? - bumped(-h)?) / (2.0 * h)),
            }
        })
        .collect()
}
