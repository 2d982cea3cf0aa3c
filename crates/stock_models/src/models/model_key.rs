//! Model identifiers.
//!
//! `ModelKey` is the closed set of supported population-dynamics models;
//! adding a model is a code change. `ModelSelector` is what the boundary
//! produces from raw selector text: either a known key or an explicit
//! "unrecognised" value that the dispatcher maps to a zero objective.

use std::fmt;
use std::str::FromStr;

use stock_core::traits::ObjectiveFunction;
use stock_core::types::ModelError;
use tracing::warn;

use super::{
    ContinuousDelayDifference, DelayDifference, RapidConditioning, StatisticalCatchAtAge,
    SurplusProduction, VirtualPopulationAnalysis,
};

/// Supported population-dynamics models.
///
/// # Example
///
/// ```
/// use stock_models::models::ModelKey;
///
/// let key: ModelKey = "cDD".parse().unwrap();
/// assert_eq!(key, ModelKey::ContinuousDelayDifference);
/// assert_eq!(key.code(), "cDD");
/// assert!("cdd".parse::<ModelKey>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelKey {
    /// Deriso-Schnute delay-difference model, discrete harvest
    #[cfg_attr(feature = "serde", serde(rename = "DD"))]
    DelayDifference,
    /// Pella-Tomlinson surplus production model
    #[cfg_attr(feature = "serde", serde(rename = "SP"))]
    SurplusProduction,
    /// Statistical catch-at-age model
    #[cfg_attr(feature = "serde", serde(rename = "SCA"))]
    StatisticalCatchAtAge,
    /// Virtual population analysis tuned to an index
    #[cfg_attr(feature = "serde", serde(rename = "VPA"))]
    VirtualPopulationAnalysis,
    /// Delay-difference model in continuous time
    #[cfg_attr(feature = "serde", serde(rename = "cDD"))]
    ContinuousDelayDifference,
    /// Catch-conditioned, multi-fleet age-structured model
    #[cfg_attr(feature = "serde", serde(rename = "RCM"))]
    RapidConditioningModel,
}

impl ModelKey {
    /// Every supported model, in declaration order.
    pub const ALL: [ModelKey; 6] = [
        ModelKey::DelayDifference,
        ModelKey::SurplusProduction,
        ModelKey::StatisticalCatchAtAge,
        ModelKey::VirtualPopulationAnalysis,
        ModelKey::ContinuousDelayDifference,
        ModelKey::RapidConditioningModel,
    ];

    /// Selector code ("DD", "SP", "SCA", "VPA", "cDD", "RCM"), as declared
    /// by the model's evaluator.
    pub fn code(&self) -> &'static str {
        match self {
            ModelKey::DelayDifference => DelayDifference::code(),
            ModelKey::SurplusProduction => SurplusProduction::code(),
            ModelKey::StatisticalCatchAtAge => StatisticalCatchAtAge::code(),
            ModelKey::VirtualPopulationAnalysis => VirtualPopulationAnalysis::code(),
            ModelKey::ContinuousDelayDifference => ContinuousDelayDifference::code(),
            ModelKey::RapidConditioningModel => RapidConditioning::code(),
        }
    }

    /// Human-readable model name.
    pub fn name(&self) -> &'static str {
        match self {
            ModelKey::DelayDifference => "Delay-difference",
            ModelKey::SurplusProduction => "Surplus production",
            ModelKey::StatisticalCatchAtAge => "Statistical catch-at-age",
            ModelKey::VirtualPopulationAnalysis => "Virtual population analysis",
            ModelKey::ContinuousDelayDifference => "Continuous delay-difference",
            ModelKey::RapidConditioningModel => "Rapid conditioning model",
        }
    }

    /// Whether the model tracks numbers at age.
    pub fn is_age_structured(&self) -> bool {
        matches!(
            self,
            ModelKey::StatisticalCatchAtAge
                | ModelKey::VirtualPopulationAnalysis
                | ModelKey::RapidConditioningModel
        )
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ModelKey {
    type Err = ModelError;

    /// Exact, case-sensitive match on the selector code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKey::ALL
            .iter()
            .copied()
            .find(|k| k.code() == s)
            .ok_or_else(|| ModelError::InvalidSelector(s.to_string()))
    }
}

/// A parsed model selector.
///
/// Produced once at the boundary where the raw selector text arrives.
/// `Unrecognized` keeps the raw text so callers can surface it; the
/// dispatcher evaluates it to zero.
///
/// # Example
///
/// ```
/// use stock_models::models::{ModelKey, ModelSelector};
///
/// assert_eq!(ModelSelector::parse("SCA"), ModelSelector::Known(ModelKey::StatisticalCatchAtAge));
/// assert!(!ModelSelector::parse("SCA2").is_known());
/// assert!(ModelSelector::strict("SCA2").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelSelector {
    /// A supported model
    Known(ModelKey),
    /// Selector text that names no supported model
    Unrecognized(String),
}

impl ModelSelector {
    /// Parse selector text, falling back to `Unrecognized`.
    ///
    /// An unrecognised selector makes the objective identically zero, which
    /// can hide a typo in a fitting run, so it is logged at `warn`.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<ModelKey>() {
            Ok(key) => ModelSelector::Known(key),
            Err(_) => {
                warn!(
                    selector = raw,
                    "unrecognised model selector; objective evaluates to zero"
                );
                ModelSelector::Unrecognized(raw.to_string())
            }
        }
    }

    /// Parse selector text, rejecting unknown models.
    pub fn strict(raw: &str) -> Result<Self, ModelError> {
        raw.parse::<ModelKey>().map(ModelSelector::Known)
    }

    /// The model key, if known.
    pub fn key(&self) -> Option<ModelKey> {
        match self {
            ModelSelector::Known(key) => Some(*key),
            ModelSelector::Unrecognized(_) => None,
        }
    }

    /// Check if the selector names a supported model.
    pub fn is_known(&self) -> bool {
        matches!(self, ModelSelector::Known(_))
    }
}

impl From<ModelKey> for ModelSelector {
    fn from(key: ModelKey) -> Self {
        ModelSelector::Known(key)
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSelector::Known(key) => write!(f, "{}", key),
            ModelSelector::Unrecognized(raw) => write!(f, "unrecognised({})", raw),
        }
    }
}
