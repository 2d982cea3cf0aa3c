//! Configuration for finite-difference derivatives and gradient checks.

/// Finite-difference scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FiniteDifferenceScheme {
    /// `(f(x + h) - f(x)) / h`
    Forward,
    /// `(f(x + h) - f(x - h)) / 2h`
    #[default]
    Central,
}

/// Finite-difference and verification settings.
///
/// # Examples
/// ```
/// use stock_models::derivatives::{DerivativeConfig, FiniteDifferenceScheme};
///
/// let config = DerivativeConfig::default()
///     .with_step(1e-4)
///     .with_scheme(FiniteDifferenceScheme::Forward);
/// assert_eq!(config.step_for(200.0), 2e-2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DerivativeConfig {
    /// Relative step, scaled by `max(1, |x|)`.
    pub step: f64,

    /// Differencing scheme.
    pub scheme: FiniteDifferenceScheme,

    /// Relative tolerance for AD vs finite-difference agreement.
    pub relative_tolerance: f64,

    /// Absolute tolerance for AD vs finite-difference agreement.
    pub absolute_tolerance: f64,
}

impl Default for DerivativeConfig {
    fn default() -> Self {
        Self {
            step: 1e-5,
            scheme: FiniteDifferenceScheme::Central,
            relative_tolerance: 1e-4,
            absolute_tolerance: 1e-5,
        }
    }
}

impl DerivativeConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the relative step.
    #[inline]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Sets the differencing scheme.
    #[inline]
    pub fn with_scheme(mut self, scheme: FiniteDifferenceScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the relative and absolute tolerances.
    #[inline]
    pub fn with_tolerance(mut self, relative: f64, absolute: f64) -> Self {
        self.relative_tolerance = relative;
        self.absolute_tolerance = absolute;
        self
    }

    /// Absolute step used for a parameter at value `x`.
    #[inline]
    pub fn step_for(&self, x: f64) -> f64 {
        self.step * x.abs().max(1.0)
    }

    /// Whether an AD and a finite-difference value agree.
    #[inline]
    pub fn agrees(&self, ad: f64, fd: f64) -> bool {
        let scale = ad.abs().max(fd.abs());
        (ad - fd).abs() <= self.absolute_tolerance + self.relative_tolerance * scale
    }
}
