//! Lognormal index likelihood with analytic catchability.

use std::str::FromStr;

use stock_core::math::cast;
use stock_core::math::density::sum_dnorm_log;
use stock_core::traits::Float;

/// Which biomass an abundance index tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IndexType {
    /// Total biomass
    #[default]
    Biomass,
    /// Biomass vulnerable to the (first) fleet
    VulnerableBiomass,
    /// Spawning biomass
    SpawningBiomass,
}

impl FromStr for IndexType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(IndexType::Biomass),
            "VB" => Ok(IndexType::VulnerableBiomass),
            "SSB" => Ok(IndexType::SpawningBiomass),
            other => Err(format!("unknown I_type '{}', expected B, VB or SSB", other)),
        }
    }
}

/// Result of fitting an index to predicted biomass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexFit<T> {
    /// Negative log-likelihood
    pub nll: T,
    /// Catchability
    pub q: T,
    /// Number of observed years
    pub n_obs: usize,
}

/// Fit a lognormal index with the conditional MLE of catchability.
///
/// # Mathematical Definition
/// ```text
/// ln q = mean_t (ln I_t - ln B_t)          over observed t
/// nll  = -Σ_t ln N(ln I_t; ln q + ln B_t, τ)
/// ```
///
/// Observations that are `NaN` or non-positive are missing. With no
/// observed years `q = 1` and `nll = 0`.
pub fn fit_index<T: Float>(obs: &[f64], pred: &[T], tau: T) -> IndexFit<T> {
    let mut sum = T::zero();
    let mut n_obs = 0usize;
    for (&o, &p) in obs.iter().zip(pred) {
        if o.is_finite() && o > 0.0 {
            sum = sum + cast::<T>(o.ln()) - p.ln();
            n_obs += 1;
        }
    }
    if n_obs == 0 {
        return IndexFit {
            nll: T::zero(),
            q: T::one(),
            n_obs,
        };
    }
    let q = (sum / cast::<T>(n_obs as f64)).exp();
    let scaled: Vec<T> = pred.iter().map(|&p| q * p).collect();
    let (ll, _) = sum_dnorm_log(obs, &scaled, tau);
    IndexFit { nll: -ll, q, n_obs }
}
