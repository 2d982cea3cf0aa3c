//! Models command implementation
//!
//! Lists the supported model selectors.

use serde::Serialize;
use stock_models::models::ModelKey;

use crate::config::OutputFormat;
use crate::Result;

#[derive(Debug, Serialize)]
struct ModelInfo {
    code: &'static str,
    name: &'static str,
    age_structured: bool,
}

fn catalogue() -> Vec<ModelInfo> {
    ModelKey::ALL
        .iter()
        .map(|k| ModelInfo {
            code: k.code(),
            name: k.name(),
            age_structured: k.is_age_structured(),
        })
        .collect()
}

/// Run the models command
pub fn run(format: OutputFormat) -> Result<()> {
    let models = catalogue();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&models)?),
        OutputFormat::Table => {
            println!("{:<6} {:<42} {}", "Code", "Model", "Ages");
            println!("{}", "-".repeat(56));
            for m in &models {
                println!(
                    "{:<6} {:<42} {}",
                    m.code,
                    m.name,
                    if m.age_structured { "yes" } else { "no" }
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
    fn test_catalogue_lists_every_code_once() {
        let codes: Vec<&str> = catalogue().iter().map(|m| m.code).collect();
        assert_eq!(codes, vec!["DD", "SP", "SCA", "VPA", "cDD", "RCM"]);
    }

    #[test]
    fn test_run_both_formats() {
        assert!(run(OutputFormat::Table).is_ok());
        assert!(run(OutputFormat::Json).is_ok());
    }
}
