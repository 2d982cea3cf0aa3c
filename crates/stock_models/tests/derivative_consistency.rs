//! Dual-number derivatives against finite differences for every model.
//!
//! The evaluators are written once against `T: Float`; these tests check
//! that running them at `Dual64` and `HyperDual64` gives the same values as
//! the `f64` path and derivatives consistent with finite differences.

use approx::assert_relative_eq;
use num_dual::{Dual64, HyperDual64};
use stock_core::bundle::{Report, ReportValue};
use stock_models::demo;
use stock_models::derivatives::{
    finite_difference_gradient, gradient, hessian, objective_value, verify_gradient,
    DerivativeConfig,
};
use stock_models::models::{evaluate, objective, ModelKey, ModelSelector};

#[test]
fn test_dual_value_matches_plain_value() {
    for (key, bundle) in demo::all_bundles().unwrap() {
        let selector = ModelSelector::from(key);
        let plain = objective_value(&selector, &bundle).unwrap();

        let dual = bundle.map_parameters(|_, x| Dual64::from(x));
        let y = objective(&selector, &dual, &mut Report::new()).unwrap();
        assert_relative_eq!(y.re, plain, max_relative = 1e-14);
        assert_eq!(y.eps, 0.0, "{}", key);

        let hyper = bundle.map_parameters(|_, x| HyperDual64::from(x));
        let y = objective(&selector, &hyper, &mut Report::new()).unwrap();
        assert_relative_eq!(y.re, plain, max_relative = 1e-14);
    }
}

#[test]
fn test_dual_report_real_parts_match_plain_report() {
    for (key, bundle) in demo::all_bundles().unwrap() {
        let selector = ModelSelector::from(key);
        let plain = evaluate::<f64>(&selector, &bundle).unwrap();
        let dual = evaluate::<Dual64>(&selector, &bundle.map_parameters(|_, x| Dual64::from(x)))
            .unwrap();
        let real = dual.report.map(|v| v.re);
        assert_eq!(real.len(), plain.report.len(), "{}", key);
        for entry in plain.report.entries() {
            let b = real.get(&entry.name).unwrap();
            let (a, b) = match (&entry.value, b) {
                (ReportValue::Scalar(a), ReportValue::Scalar(b)) => (vec![*a], vec![*b]),
                (a, b) => (a.as_slice().unwrap().to_vec(), b.as_slice().unwrap().to_vec()),
            };
            assert_eq!(a.len(), b.len(), "{} {}", key, entry.name);
            for (x, y) in a.iter().zip(&b) {
                assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-12);
            }
        }
    }
}

#[test]
fn test_gradient_agrees_with_finite_differences() {
    let config = DerivativeConfig::default();
    for (key, bundle) in demo::all_bundles().unwrap() {
        let check = verify_gradient(&ModelSelector::from(key), &bundle, &config).unwrap();
        assert!(check.all_passed(), "{}", check.summary());
        assert_eq!(check.components.len(), bundle.parameters().len());
    }
}

#[test]
fn test_gradient_nonzero_for_observed_models() {
    for (key, bundle) in demo::all_bundles().unwrap() {
        let g = gradient(&ModelSelector::from(key), &bundle).unwrap();
        let norm: f64 = g.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!(norm > 0.0, "{} has a flat objective at the demo point", key);
    }
}

#[test]
fn test_hessian_symmetric_and_finite() {
    for key in [
        ModelKey::DelayDifference,
        ModelKey::SurplusProduction,
        ModelKey::ContinuousDelayDifference,
    ] {
        let bundle = demo::bundle_for(key).unwrap();
        let h = hessian(&ModelSelector::from(key), &bundle).unwrap();
        let n = bundle.parameters().len();
        assert_eq!(h.len(), n);
        for i in 0..n {
            assert_eq!(h[i].len(), n);
            for j in 0..n {
                assert!(h[i][j].is_finite());
                assert_eq!(h[i][j], h[j][i]);
            }
        }
    }
}

#[test]
fn test_hessian_diagonal_matches_gradient_differences() {
    let key = ModelKey::DelayDifference;
    let selector = ModelSelector::from(key);
    let bundle = demo::bundle_for(key).unwrap();
    let h = hessian(&selector, &bundle).unwrap();

    let step = 1e-5;
    for i in 0..bundle.parameters().len() {
        let shifted = |d: f64| bundle.map_parameters(|j, x| if i == j { x + d } else { x });
        let up = gradient(&selector, &shifted(step)).unwrap();
        let down = gradient(&selector, &shifted(-step)).unwrap();
        let fd = (up[i] - down[i]) / (2.0 * step);
        assert_relative_eq!(h[i][i], fd, epsilon = 1e-3, max_relative = 1e-3);
    }
}

#[test]
fn test_finite_difference_unknown_selector_is_zero() {
    let bundle = demo::bundle_for(ModelKey::VirtualPopulationAnalysis).unwrap();
    let fd = finite_difference_gradient(
        &ModelSelector::parse("??"),
        &bundle,
        &DerivativeConfig::default(),
    )
    .unwrap();
    assert!(fd.iter().all(|&x| x == 0.0));
}

#[test]
fn test_rcm_year_without_first_fleet_catch_stays_finite() {
    let bundle = demo::bundle_for(ModelKey::RapidConditioningModel).unwrap();
    let mut catch = bundle.data().matrix("C_hist").unwrap().clone();
    let cols = catch.cols;
    catch.values[7 * cols] = 0.0;
    let bundle = bundle.with_data("C_hist", catch);
    let selector = ModelSelector::from(ModelKey::RapidConditioningModel);

    let value = objective_value(&selector, &bundle).unwrap();
    assert!(value.is_finite());

    let g = gradient(&selector, &bundle).unwrap();
    assert!(g.iter().all(|x| x.is_finite()));
}
