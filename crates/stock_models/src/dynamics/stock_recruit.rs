//! Stock-recruit relationships parameterised by steepness.

use std::fmt;
use std::str::FromStr;

use stock_core::math::cast;
use stock_core::math::transform::{steepness_bh, steepness_ricker};
use stock_core::traits::Float;

/// Functional form of the stock-recruit relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SRType {
    /// Beverton-Holt, `R = αS / (1 + βS)`
    #[default]
    BevertonHolt,
    /// Ricker, `R = αS·exp(-βS)`
    Ricker,
}

impl SRType {
    /// Data code ("BH" or "Ricker").
    pub fn code(&self) -> &'static str {
        match self {
            SRType::BevertonHolt => "BH",
            SRType::Ricker => "Ricker",
        }
    }

    /// Steepness on the natural scale from its unconstrained parameter.
    ///
    /// Beverton-Holt steepness is bounded to (0.2, 1); Ricker steepness to
    /// (0.2, ∞).
    pub fn steepness<T: Float>(&self, transformed_h: T) -> T {
        match self {
            SRType::BevertonHolt => steepness_bh(transformed_h),
            SRType::Ricker => steepness_ricker(transformed_h),
        }
    }
}

impl fmt::Display for SRType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SRType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BH" => Ok(SRType::BevertonHolt),
            "Ricker" => Ok(SRType::Ricker),
            other => Err(format!("unknown SR_type '{}', expected BH or Ricker", other)),
        }
    }
}

/// Stock-recruit curve with `α`, `β` solved from steepness.
///
/// Both forms pass through `(φ0·R0, R0)`: unfished spawners produce unfished
/// recruitment.
///
/// # Examples
/// ```
/// use stock_models::dynamics::{SRType, StockRecruit};
///
/// let sr = StockRecruit::from_steepness(SRType::BevertonHolt, 0.7_f64, 2.0, 1000.0);
/// assert!((sr.recruits(2000.0) - 1000.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StockRecruit<T> {
    sr_type: SRType,
    alpha: T,
    beta: T,
}

impl<T: Float> StockRecruit<T> {
    /// Solve `α`, `β` from steepness `h`, spawners per recruit `φ0` and
    /// unfished recruitment `R0`.
    ///
    /// # Mathematical Definition
    /// ```text
    /// BH:     α = 4h / ((1-h)·φ0)        β = (5h-1) / ((1-h)·φ0·R0)
    /// Ricker: α = (5h)^1.25 / φ0         β = 1.25·ln(5h) / (φ0·R0)
    /// ```
    pub fn from_steepness(sr_type: SRType, h: T, phi0: T, r0: T) -> Self {
        let (alpha, beta) = match sr_type {
            SRType::BevertonHolt => {
                let one_minus_h = T::one() - h;
                (
                    cast::<T>(4.0) * h / (one_minus_h * phi0),
                    (cast::<T>(5.0) * h - T::one()) / (one_minus_h * phi0 * r0),
                )
            }
            SRType::Ricker => {
                let five_h = cast::<T>(5.0) * h;
                (
                    five_h.powf(cast(1.25)) / phi0,
                    cast::<T>(1.25) * five_h.ln() / (phi0 * r0),
                )
            }
        };
        Self {
            sr_type,
            alpha,
            beta,
        }
    }

    /// Expected recruitment from spawners `s`.
    #[inline]
    pub fn recruits(&self, s: T) -> T {
        match self.sr_type {
            SRType::BevertonHolt => self.alpha * s / (T::one() + self.beta * s),
            SRType::Ricker => self.alpha * s * (-self.beta * s).exp(),
        }
    }

    /// Maximum recruits per spawner.
    pub fn alpha(&self) -> T {
        self.alpha
    }

    /// Density-dependence coefficient.
    pub fn beta(&self) -> T {
        self.beta
    }

    /// Functional form.
    pub fn sr_type(&self) -> SRType {
        self.sr_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_codes() {
        assert_eq!("BH".parse::<SRType>().unwrap(), SRType::BevertonHolt);
        assert_eq!("Ricker".parse::<SRType>().unwrap(), SRType::Ricker);
        assert!("bh".parse::<SRType>().is_err());
    }

    #[test]
    fn test_unfished_replacement() {
        for sr in [SRType::BevertonHolt, SRType::Ricker] {
            let curve = StockRecruit::from_steepness(sr, 0.8_f64, 3.5, 250.0);
            assert_relative_eq!(curve.recruits(3.5 * 250.0), 250.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_steepness_definition_bh() {
        // Recruitment at 20% of unfished spawners is h·R0
        let h = 0.65;
        let curve = StockRecruit::from_steepness(SRType::BevertonHolt, h, 1.0, 100.0);
        assert_relative_eq!(curve.recruits(20.0), h * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_steepness_definition_ricker() {
        let h = 1.5;
        let curve = StockRecruit::from_steepness(SRType::Ricker, h, 1.0, 100.0);
        assert_relative_eq!(curve.recruits(20.0), h * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_spawners_zero_recruits() {
        let curve = StockRecruit::from_steepness(SRType::BevertonHolt, 0.7_f64, 1.0, 10.0);
        assert_eq!(curve.recruits(0.0), 0.0);
    }

    #[test]
    fn test_steepness_transform_by_type() {
        assert_relative_eq!(SRType::BevertonHolt.steepness(0.0_f64), 0.6, epsilon = 1e-12);
        assert_relative_eq!(SRType::Ricker.steepness(0.0_f64), 1.2, epsilon = 1e-12);
    }
}
