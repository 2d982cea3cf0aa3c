//! Stockfit CLI - Command Line Evaluation of Stock-Assessment Models
//!
//! This is the operational entry point for the stock-assessment objective
//! functions.
//!
//! # Commands
//!
//! - `stockfit eval --input <bundle.json>` - Evaluate one model on a bundle
//! - `stockfit models` - List supported model selectors
//! - `stockfit demo` - Evaluate the built-in demo bundles
//! - `stockfit check` - Validate configuration and self-test every model
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate reads bundle files and
//! configuration, calls into `stock_models`, and formats the results.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use commands::eval::EvalOptions;
use config::{CliConfig, OutputFormat};

/// Stock-assessment objective function CLI
#[derive(Parser)]
#[command(name = "stockfit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "stockfit.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a model objective on a bundle file
    Eval {
        /// Path to bundle file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Model selector (DD, SP, SCA, VPA, cDD, RCM)
        #[arg(short, long)]
        model: Option<String>,

        /// Also compute the gradient
        #[arg(short, long)]
        gradient: bool,

        /// Also compute the Hessian
        #[arg(long)]
        hessian: bool,

        /// Include the model report
        #[arg(short, long)]
        report: bool,

        /// Compare the gradient with finite differences
        #[arg(long)]
        verify: bool,

        /// Output format (json, table)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// List supported models
    Models {
        /// Output format (json, table)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Evaluate the built-in demo bundles
    Demo {
        /// Only this model
        #[arg(short, long)]
        model: Option<String>,

        /// Output format (json, table)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Check configuration and self-test every model
    Check,
}

fn init_tracing(verbose: bool, config: &CliConfig) {
    let level = if verbose {
        "debug"
    } else {
        config.log_level.as_filter_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn output_format(flag: Option<&str>, config: &CliConfig) -> Result<OutputFormat> {
    flag.map_or(Ok(config.output_format), str::parse)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    init_tracing(cli.verbose, &config);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Eval {
            input,
            model,
            gradient,
            hessian,
            report,
            verify,
            format,
        } => {
            let options = EvalOptions {
                gradient,
                hessian,
                report,
                verify,
            };
            let format = output_format(format.as_deref(), &config)?;
            commands::eval::run(&input, model.as_deref(), options, format, &config)
                .with_context(|| format!("evaluating {}", input.display()))?;
        }
        Commands::Models { format } => {
            commands::models::run(output_format(format.as_deref(), &config)?)?;
        }
        Commands::Demo { model, format } => {
            commands::demo::run(model.as_deref(), output_format(format.as_deref(), &config)?)?;
        }
        Commands::Check => commands::check::run(&cli.config, &config)?,
    }
    Ok(())
}
