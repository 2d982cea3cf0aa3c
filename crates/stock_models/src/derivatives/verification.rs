//! AD gradient verification against finite differences.

use std::fmt::Write as _;

use stock_core::bundle::InputBundle;
use stock_core::types::ModelError;
use tracing::{debug, warn};

use super::config::DerivativeConfig;
use super::gradient::{finite_difference_gradient, value_and_gradient};
use crate::models::ModelSelector;

/// Comparison for one flattened parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentCheck {
    /// Parameter label, `name[i]` for vector blocks.
    pub label: String,

    /// Derivative from the dual-number sweep.
    pub ad: f64,

    /// Derivative from finite differences.
    pub fd: f64,

    /// Whether the two agree within tolerance.
    pub passed: bool,
}

impl ComponentCheck {
    /// Relative error between the AD and finite-difference values.
    pub fn relative_error(&self) -> f64 {
        relative_error(self.ad, self.fd)
    }
}

/// Result of a full gradient check.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientCheck {
    /// Model selector that was checked.
    pub selector: String,

    /// Objective value at the check point.
    pub objective: f64,

    /// One entry per flattened parameter.
    pub components: Vec<ComponentCheck>,
}

impl GradientCheck {
    /// Returns true if every component agrees.
    pub fn all_passed(&self) -> bool {
        self.components.iter().all(|c| c.passed)
    }

    /// Number of disagreeing components.
    pub fn failed_count(&self) -> usize {
        self.components.iter().filter(|c| !c.passed).count()
    }

    /// Largest relative error over all components.
    pub fn max_relative_error(&self) -> f64 {
        self.components
            .iter()
            .map(ComponentCheck::relative_error)
            .fold(0.0, f64::max)
    }

    /// Human-readable summary.
    pub fn summary(&self) -> String {
        let mut s = format!(
            "{}: objective {:.6}, {}/{} components agree (max rel err {:.2e})\n",
            self.selector,
            self.objective,
            self.components.len() - self.failed_count(),
            self.components.len(),
            self.max_relative_error(),
        );
        for c in self.components.iter().filter(|c| !c.passed) {
            let _ = writeln!(s, "  FAIL {}: ad={:.6e} fd={:.6e}", c.label, c.ad, c.fd);
        }
        s
    }
}

/// Compares the AD gradient with a finite-difference gradient.
///
/// # Examples
/// ```
/// use stock_models::demo;
/// use stock_models::derivatives::{verify_gradient, DerivativeConfig};
/// use stock_models::models::{ModelKey, ModelSelector};
///
/// let bundle = demo::bundle_for(ModelKey::DelayDifference).unwrap();
/// let check = verify_gradient(&ModelSelector::parse("DD"), &bundle, &DerivativeConfig::default())
///     .unwrap();
/// assert!(check.all_passed(), "{}", check.summary());
/// ```
pub fn verify_gradient(
    selector: &ModelSelector,
    bundle: &InputBundle<f64>,
    config: &DerivativeConfig,
) -> Result<GradientCheck, ModelError> {
    let (objective, ad) = value_and_gradient(selector, bundle)?;
    let fd = finite_difference_gradient(selector, bundle, config)?;

    let components: Vec<ComponentCheck> = bundle
        .parameters()
        .labels()
        .into_iter()
        .zip(ad.into_iter().zip(fd))
        .map(|(label, (ad, fd))| ComponentCheck {
            passed: config.agrees(ad, fd),
            label,
            ad,
            fd,
        })
        .collect();

    let check = GradientCheck {
        selector: selector.to_string(),
        objective,
        components,
    };
    if check.all_passed() {
        debug!(%selector, n = check.components.len(), "gradient check passed");
    } else {
        warn!(%selector, failed = check.failed_count(), "gradient check failed");
    }
    Ok(check)
}

fn relative_error(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale < 1e-12 {
        (a - b).abs()
    } else {
        (a - b).abs() / scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(label: &str, ad: f64, fd: f64, passed: bool) -> ComponentCheck {
        ComponentCheck {
            label: label.to_string(),
            ad,
            fd,
            passed,
        }
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(relative_error(0.0, 0.0), 0.0);
        assert!((relative_error(100.0, 99.0) - 0.01).abs() < 1e-12);
        assert!((relative_error(1e-14, 2e-14) - 1e-14).abs() < 1e-20);
    }

    #[test]
    fn test_counts_and_summary() {
        let check = GradientCheck {
            selector: "SP".to_string(),
            objective: 12.5,
            components: vec![
                component("log_FMSY", 1.0, 1.0, true),
                component("MSYx", 2.0, 3.0, false),
            ],
        };
        assert!(!check.all_passed());
        assert_eq!(check.failed_count(), 1);
        assert!((check.max_relative_error() - 1.0 / 3.0).abs() < 1e-12);
        let summary = check.summary();
        assert!(summary.contains("1/2"));
        assert!(summary.contains("FAIL MSYx"));
        assert!(!summary.contains("FAIL log_FMSY"));
    }

    #[test]
    fn test_unrecognised_selector_passes_trivially() {
        let bundle = crate::demo::bundle_for(crate::models::ModelKey::StatisticalCatchAtAge).unwrap();
        let check = verify_gradient(
            &ModelSelector::parse("nope"),
            &bundle,
            &DerivativeConfig::default(),
        )
        .unwrap();
        assert_eq!(check.objective, 0.0);
        assert!(check.all_passed());
        assert_eq!(check.components.len(), bundle.parameters().len());
    }
}
