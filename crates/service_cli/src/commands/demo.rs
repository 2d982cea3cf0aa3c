//! Demo command implementation
//!
//! Evaluates the built-in synthetic bundles in parallel and prints one row
//! per model. Each demo bundle is observed from its own true parameters, so
//! every objective is finite and penalty-free.

use serde::Serialize;
use stock_models::batch::{BatchConfig, BatchEvaluator, BatchJob};
use stock_models::demo;
use stock_models::models::{ModelKey, ModelSelector};
use tracing::info;

use crate::config::OutputFormat;
use crate::{CliError, Result};

/// One evaluated demo bundle.
#[derive(Debug, Serialize)]
pub struct DemoRow {
    pub model: &'static str,
    pub name: &'static str,
    pub parameters: usize,
    pub objective: f64,
}

/// Demo jobs for `model`, or for every model.
pub fn jobs(model: Option<&str>) -> Result<Vec<BatchJob>> {
    let keys: Vec<ModelKey> = match model {
        Some(raw) => {
            let key = ModelSelector::strict(raw)
                .ok()
                .and_then(|s| s.key())
                .ok_or_else(|| CliError::InvalidArgument(format!("no demo for model {:?}", raw)))?;
            vec![key]
        }
        None => ModelKey::ALL.to_vec(),
    };
    keys.into_iter()
        .map(|k| Ok(BatchJob::new(k.into(), demo::bundle_for(k)?)))
        .collect()
}

/// Evaluate demo jobs, failing on the first evaluator error.
pub fn evaluate(jobs: &[BatchJob]) -> Result<Vec<DemoRow>> {
    let evaluator = BatchEvaluator::new(BatchConfig::default());
    let results = evaluator.evaluate(jobs);
    info!("Evaluated {} demo bundles", evaluator.evaluated());

    jobs.iter()
        .zip(results)
        .map(|(job, result)| {
            let evaluation = result?;
            let key = job.selector.key().ok_or_else(|| {
                CliError::InvalidArgument(format!("unrecognised selector {}", job.selector))
            })?;
            Ok(DemoRow {
                model: key.code(),
                name: key.name(),
                parameters: job.bundle.parameters().len(),
                objective: evaluation.objective,
            })
        })
        .collect()
}

/// Run the demo command
pub fn run(model: Option<&str>, format: OutputFormat) -> Result<()> {
    let rows = evaluate(&jobs(model)?)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Table => {
            println!("{:<6} {:<30} {:>7} {:>16}", "Code", "Model", "Params", "Objective");
            println!("{}", "-".repeat(62));
            for r in &rows {
                println!(
                    "{:<6} {:<30} {:>7} {:>16.6}",
                    r.model, r.name, r.parameters, r.objective
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_demos_evaluate() {
        let rows = evaluate(&jobs(None).unwrap()).unwrap();
        assert_eq!(rows.len(), ModelKey::ALL.len());
        assert!(rows.iter().all(|r| r.objective.is_finite() && r.parameters > 0));
    }

    #[test]
    fn test_single_model() {
        let rows = evaluate(&jobs(Some("cDD")).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].model, "cDD");
    }

    #[test]
    fn test_unknown_model_rejected() {
        assert!(matches!(jobs(Some("cdd")), Err(CliError::InvalidArgument(_))));
    }
}
