//! Dispatch from a model selector to exactly one evaluator.
//!
//! The match over `ModelKey` is exhaustive, so a new model cannot be added
//! without routing it here. The unrecognised branch is the only place a
//! value is produced without calling an evaluator: it returns zero.

use stock_core::bundle::{InputBundle, Report};
use stock_core::traits::{Float, ObjectiveFunction};
use stock_core::types::ModelError;

use super::model_key::{ModelKey, ModelSelector};
use super::{
    ContinuousDelayDifference, DelayDifference, RapidConditioning, StatisticalCatchAtAge,
    SurplusProduction, VirtualPopulationAnalysis,
};

/// Evaluate the objective for a selector.
///
/// Known models return their evaluator's result unchanged, including its
/// errors. An unrecognised selector returns `Ok(0)` and leaves `report`
/// untouched.
///
/// # Examples
/// ```
/// use stock_core::bundle::{InputBundle, Report};
/// use stock_models::models::{objective, ModelSelector};
///
/// let bundle: InputBundle<f64> = InputBundle::default();
/// let mut report = Report::new();
/// let value = objective(&ModelSelector::parse("unknown-model-xyz"), &bundle, &mut report);
/// assert_eq!(value, Ok(0.0));
/// assert!(report.is_empty());
/// ```
pub fn objective<T: Float>(
    selector: &ModelSelector,
    bundle: &InputBundle<T>,
    report: &mut Report<T>,
) -> Result<T, ModelError> {
    match selector {
        ModelSelector::Known(key) => evaluate_key(*key, bundle, report),
        ModelSelector::Unrecognized(_) => Ok(T::zero()),
    }
}

/// Evaluate the objective of a known model.
pub fn evaluate_key<T: Float>(
    key: ModelKey,
    bundle: &InputBundle<T>,
    report: &mut Report<T>,
) -> Result<T, ModelError> {
    match key {
        ModelKey::DelayDifference => DelayDifference.objective(bundle, report),
        ModelKey::SurplusProduction => SurplusProduction.objective(bundle, report),
        ModelKey::StatisticalCatchAtAge => StatisticalCatchAtAge.objective(bundle, report),
        ModelKey::VirtualPopulationAnalysis => VirtualPopulationAnalysis.objective(bundle, report),
        ModelKey::ContinuousDelayDifference => ContinuousDelayDifference.objective(bundle, report),
        ModelKey::RapidConditioningModel => RapidConditioning.objective(bundle, report),
    }
}

/// Objective value together with the quantities reported while computing it.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation<T> {
    /// Scalar objective
    pub objective: T,
    /// Derived quantities recorded by the evaluator
    pub report: Report<T>,
}

/// Evaluate with a fresh report.
pub fn evaluate<T: Float>(
    selector: &ModelSelector,
    bundle: &InputBundle<T>,
) -> Result<Evaluation<T>, ModelError> {
    let mut report = Report::new();
    let objective = objective(selector, bundle, &mut report)?;
    Ok(Evaluation { objective, report })
}
