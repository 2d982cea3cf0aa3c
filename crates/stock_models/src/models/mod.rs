//! Population-dynamics models and the dispatcher.
//!
//! This module provides:
//! - `model_key`: `ModelKey` and the boundary `ModelSelector`
//! - `dispatch`: Exhaustive routing from a selector to one evaluator
//! - One module per evaluator, each implementing `ObjectiveFunction`
//!
//! ## Example
//!
//! ```
//! use stock_core::bundle::Report;
//! use stock_core::traits::ObjectiveFunction;
//! use stock_models::demo;
//! use stock_models::models::{objective, ModelKey, ModelSelector, SurplusProduction};
//!
//! let bundle = demo::bundle_for(ModelKey::SurplusProduction).unwrap();
//!
//! let mut direct = Report::new();
//! let a = SurplusProduction.objective(&bundle, &mut direct).unwrap();
//!
//! let mut routed = Report::new();
//! let b = objective(&ModelSelector::parse("SP"), &bundle, &mut routed).unwrap();
//! assert_eq!(a, b);
//! ```

pub mod catch_at_age;
pub mod continuous_dd;
pub mod delay_difference;
pub mod dispatch;
pub mod model_key;
pub mod rcm;
pub mod surplus_production;
pub mod vpa;

pub use catch_at_age::StatisticalCatchAtAge;
pub use continuous_dd::ContinuousDelayDifference;
pub use delay_difference::DelayDifference;
pub use dispatch::{evaluate, evaluate_key, objective, Evaluation};
pub use model_key::{ModelKey, ModelSelector};
pub use rcm::RapidConditioning;
pub use surplus_production::SurplusProduction;
pub use vpa::VirtualPopulationAnalysis;

use std::str::FromStr;

use stock_core::bundle::DataSet;
use stock_core::types::ModelError;

/// Read a text switch (e.g. `SR_type`) and parse it, with a default when
/// the field is absent.
pub(crate) fn switch<S>(
    data: &DataSet,
    name: &str,
    default: &str,
    model: &'static str,
) -> Result<S, ModelError>
where
    S: FromStr<Err = String>,
{
    data.text_or(name, default)?
        .parse()
        .map_err(|e: String| ModelError::invalid_data(model, e))
}

/// Read a positive iteration count with a default.
pub(crate) fn iterations(
    data: &DataSet,
    name: &str,
    default: i64,
    model: &'static str,
) -> Result<usize, ModelError> {
    let n = data.integer_or(name, default)?;
    if n < 1 {
        return Err(ModelError::invalid_data(
            model,
            format!("{} must be at least 1, got {}", name, n),
        ));
    }
    Ok(n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::SRType;

    #[test]
    fn test_switch_default() {
        let data = DataSet::new();
        let sr: SRType = switch(&data, "SR_type", "BH", "DD").unwrap();
        assert_eq!(sr, SRType::BevertonHolt);
    }

    #[test]
    fn test_switch_invalid_value() {
        let mut data = DataSet::new();
        data.insert("SR_type", "Hockey");
        let err = switch::<SRType>(&data, "SR_type", "BH", "SCA").unwrap_err();
        assert!(matches!(err, ModelError::InvalidData { model: "SCA", .. }));
    }

    #[test]
    fn test_iterations() {
        let mut data = DataSet::new();
        assert_eq!(iterations(&data, "n_itF", 10, "RCM").unwrap(), 10);
        data.insert("n_itF", 0_i64);
        assert!(iterations(&data, "n_itF", 10, "RCM").is_err());
    }
}
