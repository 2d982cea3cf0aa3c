//! Eval command implementation
//!
//! Evaluates one model on a bundle read from a JSON file, optionally with
//! derivatives, the report, and an AD vs finite-difference check.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stock_core::bundle::{DataSet, InputBundle, ParameterSet, Report};
use stock_models::derivatives::{hessian, value_and_gradient, verify_gradient, DerivativeConfig, GradientCheck};
use stock_models::models::{evaluate, ModelSelector};
use tracing::{info, warn};

use super::output;
use crate::config::{CliConfig, OutputFormat};
use crate::{CliError, Result};

/// Bundle file layout.
///
/// ```json
/// {"model": "SP", "data": {"C_hist": [...]}, "parameters": {"MSYx": 3.9}}
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BundleFile {
    /// Optional model selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Data fields
    #[serde(default)]
    pub data: DataSet,
    /// Parameter blocks in optimiser order
    pub parameters: ParameterSet<f64>,
}

impl BundleFile {
    /// Read and parse a bundle file.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| CliError::BundleFile {
            path: path.display().to_string(),
            source,
        })
    }

    /// Split into the selector string and the bundle.
    pub fn into_parts(self) -> (Option<String>, InputBundle<f64>) {
        (self.model, InputBundle::new(self.data, self.parameters))
    }
}

/// What to compute besides the objective.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalOptions {
    pub gradient: bool,
    pub hessian: bool,
    pub report: bool,
    pub verify: bool,
}

/// One named gradient component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub parameter: String,
    pub value: f64,
}

/// Result of an evaluation, as printed.
#[derive(Debug, Clone, Serialize)]
pub struct EvalOutput {
    pub model: String,
    pub recognised: bool,
    pub objective: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<Component>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hessian: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<GradientSummary>,
}

/// Condensed gradient check.
#[derive(Debug, Clone, Serialize)]
pub struct GradientSummary {
    pub passed: bool,
    pub failed: usize,
    pub max_relative_error: f64,
    pub failures: Vec<String>,
}

impl From<&GradientCheck> for GradientSummary {
    fn from(check: &GradientCheck) -> Self {
        Self {
            passed: check.all_passed(),
            failed: check.failed_count(),
            max_relative_error: check.max_relative_error(),
            failures: check
                .components
                .iter()
                .filter(|c| !c.passed)
                .map(|c| c.label.clone())
                .collect(),
        }
    }
}

/// Pick the selector: flag, then file, then config.
pub fn resolve_selector(
    flag: Option<&str>,
    file: Option<&str>,
    config: &CliConfig,
) -> Result<ModelSelector> {
    flag.or(file)
        .or(config.default_model.as_deref())
        .map(ModelSelector::parse)
        .ok_or_else(|| {
            CliError::InvalidArgument(
                "no model given: use --model, a \"model\" field, or default_model".to_string(),
            )
        })
}

/// Evaluate a bundle according to `options`.
pub fn evaluate_bundle(
    selector: &ModelSelector,
    bundle: &InputBundle<f64>,
    options: EvalOptions,
    derivatives: &DerivativeConfig,
) -> Result<EvalOutput> {
    let evaluation = evaluate::<f64>(selector, bundle)?;

    let gradient = if options.gradient {
        let (_, g) = value_and_gradient(selector, bundle)?;
        let labels = bundle.parameters().labels();
        Some(
            labels
                .into_iter()
                .zip(g)
                .map(|(parameter, value)| Component { parameter, value })
                .collect(),
        )
    } else {
        None
    };
    let hessian = if options.hessian {
        Some(hessian(selector, bundle)?)
    } else {
        None
    };
    let check = if options.verify {
        let check = verify_gradient(selector, bundle, derivatives)?;
        if !check.all_passed() {
            warn!("{}", check.summary().trim_end());
        }
        Some(GradientSummary::from(&check))
    } else {
        None
    };

    Ok(EvalOutput {
        model: selector.to_string(),
        recognised: selector.is_known(),
        objective: evaluation.objective,
        gradient,
        hessian,
        report: options.report.then_some(evaluation.report),
        check,
    })
}

/// Run the eval command
pub fn run(
    input: &Path,
    model: Option<&str>,
    options: EvalOptions,
    format: OutputFormat,
    config: &CliConfig,
) -> Result<()> {
    info!("Evaluating bundle {}", input.display());
    let (file_model, bundle) = BundleFile::read(input)?.into_parts();
    let selector = resolve_selector(model, file_model.as_deref(), config)?;

    let result = evaluate_bundle(&selector, &bundle, options, &config.derivative_config())?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => output::print_evaluation(&result),
    }
    Ok(())
}
