//! Integration tests for the numeric helpers under dual-number scalars.
//!
//! Every helper is generic over `Float`; running it at `Dual64` must give
//! the `f64` value in the real part and the analytic derivative in the
//! dual part.

#![cfg(feature = "num-dual-mode")]

use approx::assert_relative_eq;
use stock_core::bundle::{InputBundle, ParameterSet};
use stock_core::math::density::{dnorm, sum_dnorm_log};
use stock_core::math::penalty::{posfun, POSFUN_WEIGHT};
use stock_core::math::transform::{invlogit, steepness_bh, steepness_ricker};
use stock_core::types::dual::{DualNumber, HyperDualNumber};

/// d/dμ ln N(x; μ, σ) = (x - μ) / σ²
#[test]
fn test_dnorm_derivative_in_mean() {
    let (x, mu, sd) = (1.3, 0.4, 0.7);
    let ll = dnorm(DualNumber::from(x), DualNumber::new(mu, 1.0), DualNumber::from(sd));
    assert_relative_eq!(ll.re, dnorm(x, mu, sd), epsilon = 1e-14);
    assert_relative_eq!(ll.eps, (x - mu) / (sd * sd), epsilon = 1e-12);
}

/// d/dσ ln N(x; μ, σ) = -1/σ + (x - μ)² / σ³
#[test]
fn test_dnorm_derivative_in_sd() {
    let (x, mu, sd) = (2.0, 0.5, 1.5);
    let ll = dnorm(DualNumber::from(x), DualNumber::from(mu), DualNumber::new(sd, 1.0));
    let expected = -1.0 / sd + (x - mu).powi(2) / sd.powi(3);
    assert_relative_eq!(ll.eps, expected, epsilon = 1e-12);
}

/// Missing observations carry no derivative.
#[test]
fn test_sum_dnorm_log_skips_missing() {
    let obs = [2.0, f64::NAN, 0.0, 4.0];
    let pred = [
        DualNumber::new(2.5, 1.0),
        DualNumber::new(3.0, 1.0),
        DualNumber::new(3.0, 1.0),
        DualNumber::new(3.5, 0.0),
    ];
    let (ll, n) = sum_dnorm_log(&obs, &pred, DualNumber::from(0.2));
    assert_eq!(n, 2);
    // Only the first prediction is seeded and observed
    let expected = (2.0_f64.ln() - 2.5_f64.ln()) / (0.04 * 2.5);
    assert_relative_eq!(ll.eps, expected, epsilon = 1e-10);
}

#[test]
fn test_posfun_derivative_continuous_at_threshold() {
    let eps = 0.1;
    let mut pen = DualNumber::from(0.0);
    let above = posfun(DualNumber::new(eps + 1e-9, 1.0), DualNumber::from(eps), &mut pen);
    let mut pen_below = DualNumber::from(0.0);
    let below = posfun(DualNumber::new(eps - 1e-9, 1.0), DualNumber::from(eps), &mut pen_below);
    assert_relative_eq!(above.eps, 1.0, epsilon = 1e-12);
    assert_relative_eq!(below.eps, 1.0, epsilon = 1e-6);
    assert_eq!(pen.re, 0.0);
    assert!(pen_below.re > 0.0);
}

#[test]
fn test_posfun_penalty_gradient() {
    // penalty = w·(x - ε)², d/dx = 2w·(x - ε)
    let (x, eps) = (-0.5, 0.05);
    let mut pen = DualNumber::from(0.0);
    posfun(DualNumber::new(x, 1.0), DualNumber::from(eps), &mut pen);
    assert_relative_eq!(pen.eps, 2.0 * POSFUN_WEIGHT * (x - eps), epsilon = 1e-12);
}

#[test]
fn test_steepness_transform_derivatives() {
    let x = 0.3;
    let h = steepness_bh(DualNumber::new(x, 1.0));
    let p = invlogit(x);
    assert_relative_eq!(h.eps, 0.8 * p * (1.0 - p), epsilon = 1e-12);

    let h = steepness_ricker(DualNumber::new(x, 1.0));
    assert_relative_eq!(h.eps, x.exp(), epsilon = 1e-12);
}

#[test]
fn test_hyperdual_second_derivative_of_dnorm() {
    // d²/dμ² ln N = -1/σ²
    let mu = HyperDualNumber::new(0.2, 1.0, 1.0, 0.0);
    let ll = dnorm(HyperDualNumber::from(1.0), mu, HyperDualNumber::from(0.5));
    assert_relative_eq!(ll.eps1eps2, -4.0, epsilon = 1e-12);
}

#[test]
fn test_bundle_seeding_through_map_parameters() {
    let mut params = ParameterSet::new();
    params.insert("a", vec![1.0_f64]);
    params.insert("b", vec![2.0, 3.0]);
    let bundle = InputBundle::new(Default::default(), params);

    let seeded = bundle.map_parameters(|i, x| DualNumber::new(x, if i == 2 { 1.0 } else { 0.0 }));
    let b = seeded.parameters().vector("b").unwrap();
    assert_eq!(b[1].re, 3.0);
    assert_eq!(b[1].eps, 1.0);
    assert_eq!(b[0].eps, 0.0);
    assert_eq!(seeded.parameters().scalar("a").unwrap().eps, 0.0);
}
