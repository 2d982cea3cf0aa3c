//! Integration tests for model dispatch.
//!
//! Verifies that the dispatcher forwards each evaluator's result unchanged,
//! that unknown selectors contribute zero, and that evaluation is
//! deterministic and safe to run concurrently.

use proptest::prelude::*;
use rayon::prelude::*;
use stock_core::bundle::{InputBundle, Report};
use stock_core::traits::ObjectiveFunction;
use stock_core::types::ModelError;
use stock_models::demo;
use stock_models::models::{
    evaluate, evaluate_key, objective, ContinuousDelayDifference, DelayDifference, ModelKey,
    ModelSelector, RapidConditioning, StatisticalCatchAtAge, SurplusProduction,
    VirtualPopulationAnalysis,
};

fn direct(key: ModelKey, bundle: &InputBundle<f64>, report: &mut Report<f64>) -> f64 {
    let result = match key {
        ModelKey::DelayDifference => DelayDifference.objective(bundle, report),
        ModelKey::SurplusProduction => SurplusProduction.objective(bundle, report),
        ModelKey::StatisticalCatchAtAge => StatisticalCatchAtAge.objective(bundle, report),
        ModelKey::VirtualPopulationAnalysis => VirtualPopulationAnalysis.objective(bundle, report),
        ModelKey::ContinuousDelayDifference => ContinuousDelayDifference.objective(bundle, report),
        ModelKey::RapidConditioningModel => RapidConditioning.objective(bundle, report),
    };
    result.unwrap()
}

// =============================================================================
// Pass-through
// =============================================================================

#[test]
fn test_dispatch_returns_evaluator_value_unchanged() {
    for (key, bundle) in demo::all_bundles().unwrap() {
        let mut expected_report = Report::new();
        let expected = direct(key, &bundle, &mut expected_report);

        let selector = ModelSelector::parse(key.code());
        let mut report = Report::new();
        let value = objective(&selector, &bundle, &mut report).unwrap();

        assert_eq!(value.to_bits(), expected.to_bits(), "{}", key);
        assert_eq!(report, expected_report, "{}", key);
    }
}

#[test]
fn test_evaluator_codes_match_keys() {
    let declared = [
        (ModelKey::DelayDifference, DelayDifference::code(), "DD"),
        (ModelKey::SurplusProduction, SurplusProduction::code(), "SP"),
        (ModelKey::StatisticalCatchAtAge, StatisticalCatchAtAge::code(), "SCA"),
        (ModelKey::VirtualPopulationAnalysis, VirtualPopulationAnalysis::code(), "VPA"),
        (ModelKey::ContinuousDelayDifference, ContinuousDelayDifference::code(), "cDD"),
        (ModelKey::RapidConditioningModel, RapidConditioning::code(), "RCM"),
    ];
    for (key, evaluator_code, expected) in declared {
        assert_eq!(evaluator_code, expected);
        assert_eq!(key.code(), evaluator_code);
        assert_eq!(expected.parse::<ModelKey>().unwrap(), key);
    }
}

#[test]
fn test_every_key_has_a_demo() {
    let keys: Vec<ModelKey> = demo::all_bundles().unwrap().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ModelKey::ALL.to_vec());
}

// =============================================================================
// Unrecognised selectors
// =============================================================================

#[test]
fn test_unknown_selector_contributes_zero() {
    for (_, bundle) in demo::all_bundles().unwrap() {
        for raw in ["", "dd", "Sp", "SCA ", "RCM2", "unknown-model-xyz"] {
            let selector = ModelSelector::parse(raw);
            assert!(!selector.is_known(), "{:?}", raw);
            let mut report = Report::new();
            let value = objective(&selector, &bundle, &mut report).unwrap();
            assert_eq!(value, 0.0);
            assert!(report.is_empty());
        }
    }
}

#[test]
fn test_unknown_selector_ignores_malformed_bundle() {
    let selector = ModelSelector::parse("XYZ");
    let value: f64 = objective(&selector, &InputBundle::default(), &mut Report::new()).unwrap();
    assert_eq!(value, 0.0);
}

#[test]
fn test_strict_parse_rejects_unknown() {
    let err = ModelSelector::strict("XYZ").unwrap_err();
    assert!(matches!(err, ModelError::InvalidSelector(_)));
    for key in ModelKey::ALL {
        assert_eq!(ModelSelector::strict(key.code()).unwrap().key(), Some(key));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_arbitrary_unknown_selector_is_zero(raw in "[A-Za-z0-9_ -]{0,12}") {
        prop_assume!(ModelKey::ALL.iter().all(|k| k.code() != raw));
        let bundle = demo::bundle_for(ModelKey::SurplusProduction).unwrap();
        let value: f64 = objective(&ModelSelector::parse(&raw), &bundle, &mut Report::new()).unwrap();
        prop_assert_eq!(value, 0.0);
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_errors_surface_through_dispatch() {
    let bundle = demo::bundle_for(ModelKey::SurplusProduction).unwrap();
    for key in [
        ModelKey::DelayDifference,
        ModelKey::StatisticalCatchAtAge,
        ModelKey::VirtualPopulationAnalysis,
        ModelKey::ContinuousDelayDifference,
        ModelKey::RapidConditioningModel,
    ] {
        let result = evaluate_key::<f64>(key, &bundle, &mut Report::new());
        assert!(result.is_err(), "{} accepted an SP bundle", key);
    }
}

#[test]
fn test_missing_parameter_is_bundle_error() {
    let (data, _) = demo::bundle_for(ModelKey::DelayDifference).unwrap().into_parts();
    let bundle = InputBundle::new(data, Default::default());
    let err = evaluate::<f64>(&ModelKey::DelayDifference.into(), &bundle).unwrap_err();
    assert!(err.is_bundle_error());
}

// =============================================================================
// Determinism and concurrency
// =============================================================================

#[test]
fn test_repeated_evaluation_is_bit_identical() {
    for (key, bundle) in demo::all_bundles().unwrap() {
        let selector = ModelSelector::from(key);
        let first = evaluate::<f64>(&selector, &bundle).unwrap();
        for _ in 0..3 {
            let again = evaluate::<f64>(&selector, &bundle).unwrap();
            assert_eq!(first.objective.to_bits(), again.objective.to_bits());
            assert_eq!(first.report, again.report);
        }
    }
}

#[test]
fn test_rayon_evaluation_matches_serial() {
    let jobs: Vec<(ModelSelector, InputBundle<f64>)> = demo::all_bundles().unwrap()
        .into_iter()
        .cycle()
        .take(ModelKey::ALL.len() * 8)
        .map(|(k, b)| (k.into(), b))
        .collect();

    let serial: Vec<f64> = jobs
        .iter()
        .map(|(s, b)| evaluate::<f64>(s, b).unwrap().objective)
        .collect();
    let parallel: Vec<f64> = jobs
        .par_iter()
        .map(|(s, b)| evaluate::<f64>(s, b).unwrap().objective)
        .collect();

    for (a, b) in serial.iter().zip(&parallel) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn test_std_threads_share_a_bundle() {
    let bundle = std::sync::Arc::new(demo::bundle_for(ModelKey::RapidConditioningModel).unwrap());
    let selector = ModelSelector::from(ModelKey::RapidConditioningModel);
    let expected = evaluate::<f64>(&selector, &bundle).unwrap().objective;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let bundle = std::sync::Arc::clone(&bundle);
            let selector = selector.clone();
            std::thread::spawn(move || evaluate::<f64>(&selector, &bundle).unwrap().objective)
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().to_bits(), expected.to_bits());
    }
}
