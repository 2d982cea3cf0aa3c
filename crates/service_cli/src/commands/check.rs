//! Check command implementation
//!
//! Validates the configuration and confirms that every model evaluates and
//! differentiates on its demo bundle.

use std::path::Path;

use stock_models::derivatives::verify_gradient;
use tracing::{info, warn};

use super::demo;
use crate::config::CliConfig;
use crate::{CliError, Result};

/// Outcome of the self-check.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub models_ok: Vec<String>,
    pub gradient_failures: Vec<String>,
}

impl CheckReport {
    /// Returns true if nothing failed.
    pub fn is_ok(&self) -> bool {
        self.gradient_failures.is_empty()
    }
}

/// Evaluate and gradient-check every demo bundle under `config`.
pub fn self_check(config: &CliConfig) -> Result<CheckReport> {
    config.validate()?;
    let derivatives = config.derivative_config();

    let mut report = CheckReport::default();
    for job in demo::jobs(None)? {
        let check = verify_gradient(&job.selector, &job.bundle, &derivatives)?;
        if check.all_passed() {
            report.models_ok.push(job.selector.to_string());
        } else {
            warn!("{}", check.summary().trim_end());
            report.gradient_failures.push(job.selector.to_string());
        }
    }
    Ok(report)
}

/// Run the check command
pub fn run(config_path: &Path, config: &CliConfig) -> Result<()> {
    println!("Configuration");
    println!("----------------------------------------");
    if config_path.exists() {
        println!("  file:                   {}", config_path.display());
    } else {
        println!("  file:                   (none, using defaults)");
    }
    println!("  log_level:              {}", config.log_level);
    println!(
        "  default_model:          {}",
        config.default_model.as_deref().unwrap_or("(unset)")
    );
    println!("  finite_difference_step: {:e}", config.finite_difference_step);
    println!("  output_format:          {:?}", config.output_format);
    println!();

    let report = self_check(config)?;
    println!("Models");
    println!("----------------------------------------");
    for code in &report.models_ok {
        println!("  {:<6} ok", code);
    }
    for code in &report.gradient_failures {
        println!("  {:<6} gradient mismatch", code);
    }

    if report.is_ok() {
        info!("All checks passed");
        Ok(())
    } else {
        Err(CliError::Config(format!(
            "gradient check failed for: {}",
            report.gradient_failures.join(", ")
        )))
    }
}
