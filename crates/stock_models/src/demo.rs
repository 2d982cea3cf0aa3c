//! Synthetic input bundles for every model.
//!
//! Each bundle starts from a set of "true" parameters and placeholder
//! observations, runs the model once, and replaces the observations with
//! the model's own predictions perturbed by a fixed deterministic pattern.
//! The result is internally consistent data that gives a finite objective
//! near a plausible optimum.
//!
//! # Example
//!
//! ```
//! use stock_models::demo;
//! use stock_models::models::{evaluate, ModelKey, ModelSelector};
//!
//! for key in ModelKey::ALL {
//!     let bundle = demo::bundle_for(key).unwrap();
//!     let eval = evaluate(&ModelSelector::Known(key), &bundle).unwrap();
//!     assert!(eval.objective.is_finite());
//! }
//! ```

use stock_core::bundle::{InputBundle, Matrix, Report};
use stock_core::math::transform::steepness_bh_inverse;
use stock_core::types::ModelError;
use tracing::debug;

use crate::models::{evaluate_key, ModelKey};

/// Years of history in every demo bundle.
pub const DEMO_YEARS: usize = 20;

/// Age classes in the age-structured demo bundles.
pub const DEMO_AGES: usize = 10;

/// Demo bundle for a model.
///
/// # Errors
/// Returns the evaluator's error if the model fails on its own true
/// parameters while the observations are being generated.
pub fn bundle_for(key: ModelKey) -> Result<InputBundle<f64>, ModelError> {
    match key {
        ModelKey::DelayDifference => delay_difference(),
        ModelKey::SurplusProduction => surplus_production(),
        ModelKey::StatisticalCatchAtAge => catch_at_age().map(|(bundle, _)| bundle),
        ModelKey::VirtualPopulationAnalysis => vpa(),
        ModelKey::ContinuousDelayDifference => continuous_dd(),
        ModelKey::RapidConditioningModel => rcm(),
    }
}

/// Demo bundles for every model, in `ModelKey::ALL` order.
pub fn all_bundles() -> Result<Vec<(ModelKey, InputBundle<f64>)>, ModelError> {
    ModelKey::ALL
        .iter()
        .map(|&k| bundle_for(k).map(|bundle| (k, bundle)))
        .collect()
}

/// Deterministic multiplicative noise with log-scale amplitude `cv`.
fn noise(t: usize, cv: f64) -> f64 {
    let x = t as f64;
    (cv * ((2.3 * x).sin() + 0.5 * (0.7 * x + 1.0).cos())).exp()
}

fn rec_devs(amplitude: f64) -> Vec<f64> {
    (0..DEMO_YEARS)
        .map(|t| amplitude * (0.9 * t as f64).sin())
        .collect()
}

fn ages() -> impl Iterator<Item = f64> {
    (1..=DEMO_AGES).map(|a| a as f64)
}

fn weight_at_age() -> Vec<f64> {
    ages().map(|a| 2.0 * (1.0 - (-0.35 * a).exp()).powi(3)).collect()
}

fn maturity_at_age() -> Vec<f64> {
    ages().map(|a| 1.0 / (1.0 + (-1.5 * (a - 3.5)).exp())).collect()
}

type Fill = fn(ModelKey, InputBundle<f64>, &Report<f64>) -> Result<InputBundle<f64>, ModelError>;

/// Run the model on `template` and let `fill` replace observations from
/// the report. Returns the filled bundle and the report of the true run.
fn observed(
    key: ModelKey,
    template: InputBundle<f64>,
    fill: Fill,
) -> Result<(InputBundle<f64>, Report<f64>), ModelError> {
    let mut report = Report::new();
    let objective = evaluate_key(key, &template, &mut report)?;
    debug!(model = %key, objective, "Generated demo observations");
    let bundle = fill(key, template, &report)?;
    Ok((bundle, report))
}

/// A reported series, required by the demo generator.
fn reported<'a>(
    key: ModelKey,
    report: &'a Report<f64>,
    name: &str,
) -> Result<&'a [f64], ModelError> {
    report.get_slice(name).ok_or_else(|| {
        ModelError::invalid_data(key.code(), format!("demo run did not report {}", name))
    })
}

/// Survey index proportional to the first `DEMO_YEARS` values of a series.
fn index_from(
    key: ModelKey,
    report: &Report<f64>,
    series: &str,
    q: f64,
) -> Result<Vec<f64>, ModelError> {
    Ok(reported(key, report, series)?
        .iter()
        .take(DEMO_YEARS)
        .enumerate()
        .map(|(t, &b)| q * b * noise(t, 0.15))
        .collect())
}

/// Row-normalised copy of a `rows × cols` buffer.
fn proportions(values: &[f64], cols: usize) -> Vec<f64> {
    values
        .chunks(cols)
        .flat_map(|row| {
            let total: f64 = row.iter().sum();
            row.iter().map(move |&x| x / total)
        })
        .collect()
}

/// `rows × cols` matrix from a reported buffer.
fn reported_matrix(
    key: ModelKey,
    values: Vec<f64>,
    rows: usize,
    cols: usize,
) -> Result<Matrix, ModelError> {
    let len = values.len();
    Matrix::new(rows, cols, values).ok_or_else(|| {
        ModelError::invalid_data(
            key.code(),
            format!("expected {}x{} reported values, got {}", rows, cols, len),
        )
    })
}

fn composition(key: ModelKey, report: &Report<f64>) -> Result<Matrix, ModelError> {
    let caa = reported(key, report, "CAApred")?;
    reported_matrix(key, proportions(caa, DEMO_AGES), DEMO_YEARS, DEMO_AGES)
}

fn delay_difference() -> Result<InputBundle<f64>, ModelError> {
    let catch: Vec<f64> = (0..DEMO_YEARS).map(|t| 15.0 + t as f64).collect();
    let template = InputBundle::default()
        .with_data("C_hist", catch)
        .with_data("I_hist", vec![1.0; DEMO_YEARS])
        .with_data("S0", (-0.2_f64).exp())
        .with_data("Alpha", 0.2)
        .with_data("Rho", 0.8)
        .with_data("k", 2_i64)
        .with_data("wk", 0.45)
        .with_data("SR_type", "BH")
        .with_parameter("R0x", vec![100.0_f64.ln()])
        .with_parameter("transformed_h", vec![steepness_bh_inverse(0.7)])
        .with_parameter("log_sigma", vec![0.4_f64.ln()])
        .with_parameter("log_tau", vec![0.2_f64.ln()])
        .with_parameter("log_rec_dev", rec_devs(0.2));
    let (bundle, _) = observed(ModelKey::DelayDifference, template, |key, bundle, report| {
        Ok(bundle.with_data("I_hist", index_from(key, report, "B", 0.01)?))
    })?;
    Ok(bundle)
}

fn continuous_dd() -> Result<InputBundle<f64>, ModelError> {
    let catch: Vec<f64> = (0..DEMO_YEARS).map(|t| 15.0 + t as f64).collect();
    let template = InputBundle::default()
        .with_data("C_hist", catch)
        .with_data("I_hist", vec![1.0; DEMO_YEARS])
        .with_data("Kappa", 0.3)
        .with_data("Winf", 1.0)
        .with_data("wk", 0.3)
        .with_data("M", 0.2)
        .with_data("k", 2_i64)
        .with_data("SR_type", "BH")
        .with_data("n_itF", 10_i64)
        .with_parameter("R0x", vec![100.0_f64.ln()])
        .with_parameter("transformed_h", vec![steepness_bh_inverse(0.7)])
        .with_parameter("log_sigma", vec![0.4_f64.ln()])
        .with_parameter("log_tau", vec![0.2_f64.ln()])
        .with_parameter("log_rec_dev", rec_devs(0.2));
    let (bundle, _) = observed(
        ModelKey::ContinuousDelayDifference,
        template,
        |key, bundle, report| Ok(bundle.with_data("I_hist", index_from(key, report, "Bbar", 0.01)?)),
    )?;
    Ok(bundle)
}

fn surplus_production() -> Result<InputBundle<f64>, ModelError> {
    let catch: Vec<f64> = (0..DEMO_YEARS).map(|t| 30.0 + t as f64).collect();
    let template = InputBundle::default()
        .with_data("C_hist", catch)
        .with_data("I_hist", vec![1.0; DEMO_YEARS])
        .with_parameter("log_FMSY", vec![0.2_f64.ln()])
        .with_parameter("MSYx", vec![50.0_f64.ln()])
        .with_parameter("log_dep", vec![0.9_f64.ln()])
        .with_parameter("log_n", vec![2.0_f64.ln()])
        .with_parameter("log_tau", vec![0.2_f64.ln()]);
    let (bundle, _) = observed(ModelKey::SurplusProduction, template, |key, bundle, report| {
        Ok(bundle.with_data("I_hist", index_from(key, report, "B", 0.002)?))
    })?;
    Ok(bundle)
}

/// Catch-at-age bundle with its report, shared by the VPA demo.
fn catch_at_age() -> Result<(InputBundle<f64>, Report<f64>), ModelError> {
    let log_f: Vec<f64> = (0..DEMO_YEARS)
        .map(|t| (0.05 + 0.015 * t as f64).ln())
        .collect();
    let early: Vec<f64> = (1..DEMO_AGES).map(|a| 0.1 * (1.7 * a as f64).cos()).collect();
    let template = InputBundle::default()
        .with_data("C_hist", vec![1.0; DEMO_YEARS])
        .with_data("I_hist", vec![1.0; DEMO_YEARS])
        .with_data("I_type", "B")
        .with_data("CAA_hist", Matrix::filled(DEMO_YEARS, DEMO_AGES, f64::NAN))
        .with_data("CAA_n", vec![100.0; DEMO_YEARS])
        .with_data("weight", weight_at_age())
        .with_data("mat", maturity_at_age())
        .with_data("M", 0.2)
        .with_data("SR_type", "BH")
        .with_parameter("R0x", vec![1000.0_f64.ln()])
        .with_parameter("transformed_h", vec![steepness_bh_inverse(0.75)])
        .with_parameter("vul_par", vec![3.0_f64.ln(), 2.0_f64.ln()])
        .with_parameter("log_F", log_f)
        .with_parameter("log_omega", vec![0.1_f64.ln()])
        .with_parameter("log_tau", vec![0.2_f64.ln()])
        .with_parameter("log_sigma", vec![0.5_f64.ln()])
        .with_parameter("log_early_rec_dev", early)
        .with_parameter("log_rec_dev", rec_devs(0.3));

    observed(ModelKey::StatisticalCatchAtAge, template, |key, bundle, report| {
        let catch: Vec<f64> = reported(key, report, "Cpred")?
            .iter()
            .enumerate()
            .map(|(t, &c)| c * noise(t + 3, 0.05))
            .collect();
        Ok(bundle
            .with_data("C_hist", catch)
            .with_data("I_hist", index_from(key, report, "B", 0.001)?)
            .with_data("CAA_hist", composition(key, report)?))
    })
}

fn vpa() -> Result<InputBundle<f64>, ModelError> {
    let source = ModelKey::StatisticalCatchAtAge;
    let (sca, truth) = catch_at_age()?;
    let caa = reported_matrix(
        source,
        reported(source, &truth, "CAApred")?.to_vec(),
        DEMO_YEARS,
        DEMO_AGES,
    )?;
    let n = reported(source, &truth, "N")?;
    let terminal = n
        .get((DEMO_YEARS - 1) * DEMO_AGES..DEMO_YEARS * DEMO_AGES)
        .ok_or_else(|| ModelError::invalid_data(source.code(), "N is missing the terminal year"))?;
    let log_n_terminal: Vec<f64> = terminal
        .iter()
        .enumerate()
        .map(|(a, &x)| (x * noise(a, 0.1)).ln())
        .collect();
    let index = sca.data().vector("I_hist")?.to_vec();

    Ok(InputBundle::default()
        .with_data("CAA_hist", caa)
        .with_data("weight", weight_at_age())
        .with_data("M", 0.2)
        .with_data("I_hist", index)
        .with_parameter("log_N_terminal", log_n_terminal)
        .with_parameter("log_F_ratio", vec![0.0])
        .with_parameter("log_tau", vec![0.2_f64.ln()]))
}

fn rcm() -> Result<InputBundle<f64>, ModelError> {
    let source = ModelKey::StatisticalCatchAtAge;
    let (_, truth) = catch_at_age()?;
    let by_fleet: Vec<f64> = reported(source, &truth, "Cpred")?
        .iter()
        .flat_map(|&c| [0.6 * c, 0.4 * c])
        .collect();
    let catch = reported_matrix(source, by_fleet, DEMO_YEARS, 2)?;

    let template = InputBundle::default()
        .with_data("C_hist", catch)
        .with_data("I_hist", vec![1.0; DEMO_YEARS])
        .with_data("I_type", "B")
        .with_data("n_age", DEMO_AGES as i64)
        .with_data("CAA_hist", Matrix::filled(DEMO_YEARS, DEMO_AGES, f64::NAN))
        .with_data("CAA_n", vec![50.0; DEMO_YEARS])
        .with_data("weight", weight_at_age())
        .with_data("mat", maturity_at_age())
        .with_data("M", 0.2)
        .with_data("SR_type", "BH")
        .with_data("n_itF", 10_i64)
        .with_parameter("R0x", vec![1000.0_f64.ln()])
        .with_parameter("transformed_h", vec![steepness_bh_inverse(0.75)])
        .with_parameter(
            "vul_par",
            vec![3.0_f64.ln(), 2.0_f64.ln(), 5.0_f64.ln(), 1.5_f64.ln()],
        )
        .with_parameter("log_tau", vec![0.2_f64.ln()])
        .with_parameter("log_sigma", vec![0.5_f64.ln()])
        .with_parameter("log_rec_dev", rec_devs(0.3));
    let (bundle, _) = observed(
        ModelKey::RapidConditioningModel,
        template,
        |key, bundle, report| {
            Ok(bundle
                .with_data("I_hist", index_from(key, report, "B", 0.001)?)
                .with_data("CAA_hist", composition(key, report)?))
        },
    )?;
    Ok(bundle)
}
