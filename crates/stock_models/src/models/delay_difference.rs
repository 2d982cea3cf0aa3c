//! Deriso-Schnute delay-difference model conditioned on catch.
//!
//! Biomass and numbers are projected in discrete annual steps. Harvest is
//! taken as a pulse at the start of the year, survivors grow along a
//! Ford-Walford line, and recruits enter at weight `wk` after a `k`-year lag.
//!
//! # Data
//! `C_hist`, `I_hist`, `S0` (natural survival), `Alpha`, `Rho` (Ford-Walford
//! intercept and slope), `k` (age at recruitment), `wk` (weight at `k`),
//! `SR_type` (optional, `"BH"`).
//!
//! # Parameters
//! `R0x` (log unfished recruitment), `transformed_h`, `log_sigma`, `log_tau`,
//! `log_rec_dev` (one per year).

use stock_core::bundle::{InputBundle, Report};
use stock_core::math::cast;
use stock_core::math::penalty::posfun;
use stock_core::traits::{Float, ObjectiveFunction};
use stock_core::types::ModelError;

use super::switch;
use crate::dynamics::{bias_corrected, fit_index, rec_dev_nll, SRType, StockRecruit};

const CODE: &str = "DD";

/// Floor on annual survival from fishing, `1 - U`.
const MIN_ESCAPEMENT: f64 = 0.05;

/// Deriso-Schnute delay-difference objective.
///
/// # Mathematical Definition
/// ```text
/// N0 = R0 / (1 - S0)
/// B0 = (S0·α·N0 + wk·R0) / (1 - S0·ρ)
///
/// s_t     = S0 · posfun(1 - C_t/B_t, 0.05)
/// R_{t+1} = SR(B_{t+1-k}) · exp(dev_t - σ²/2)       (R0 when t+1-k < 0)
/// B_{t+1} = s_t·(α·N_t + ρ·B_t) + wk·R_{t+1}
/// N_{t+1} = s_t·N_t + R_{t+1}
///
/// nll = index(I, B) + recdev(dev, σ) + penalty
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DelayDifference;

impl ObjectiveFunction for DelayDifference {
    fn code() -> &'static str {
        CODE
    }

    fn objective<T: Float>(
        &self,
        bundle: &InputBundle<T>,
        report: &mut Report<T>,
    ) -> Result<T, ModelError> {
        let data = bundle.data();
        let pars = bundle.parameters();

        let catch = data.vector("C_hist")?;
        let ny = catch.len();
        if ny == 0 {
            return Err(ModelError::invalid_data(CODE, "C_hist is empty"));
        }
        let index = data.vector_len("I_hist", ny)?;
        let s0 = data.scalar("S0")?;
        let alpha = data.scalar("Alpha")?;
        let rho = data.scalar("Rho")?;
        let k = data.integer("k")?;
        let wk = data.scalar("wk")?;
        let sr_type: SRType = switch(data, "SR_type", "BH", CODE)?;

        if !(s0 > 0.0 && s0 < 1.0) {
            return Err(ModelError::invalid_data(CODE, format!("S0 must be in (0, 1), got {}", s0)));
        }
        if s0 * rho >= 1.0 {
            return Err(ModelError::invalid_data(CODE, "S0 * Rho must be below 1"));
        }
        if k < 1 {
            return Err(ModelError::invalid_data(CODE, format!("k must be at least 1, got {}", k)));
        }
        let k = k as usize;

        let r0 = pars.scalar("R0x")?.exp();
        let h = sr_type.steepness(pars.scalar("transformed_h")?);
        let sigma = pars.scalar("log_sigma")?.exp();
        let tau = pars.scalar("log_tau")?.exp();
        let rec_dev = pars.vector_len("log_rec_dev", ny)?;

        let (s0, alpha, rho, wk) = (cast::<T>(s0), cast::<T>(alpha), cast::<T>(rho), cast::<T>(wk));
        let n0 = r0 / (T::one() - s0);
        let b0 = (s0 * alpha * n0 + wk * r0) / (T::one() - s0 * rho);
        let stock_recruit = StockRecruit::from_steepness(sr_type, h, b0 / r0, r0);

        let mut penalty = T::zero();
        let mut b = Vec::with_capacity(ny + 1);
        let mut n = Vec::with_capacity(ny + 1);
        let mut r = Vec::with_capacity(ny + 1);
        let mut u = Vec::with_capacity(ny);
        b.push(b0);
        n.push(n0);
        r.push(r0);

        for t in 0..ny {
            let escapement = posfun(
                T::one() - cast::<T>(catch[t]) / b[t],
                cast(MIN_ESCAPEMENT),
                &mut penalty,
            );
            u.push(T::one() - escapement);
            let survival = s0 * escapement;

            let expected = if t + 1 >= k {
                stock_recruit.recruits(b[t + 1 - k])
            } else {
                r0
            };
            let recruits = expected * bias_corrected(rec_dev[t], sigma);

            b.push(survival * (alpha * n[t] + rho * b[t]) + wk * recruits);
            n.push(survival * n[t] + recruits);
            r.push(recruits);
        }

        let index_fit = fit_index(index, &b[..ny], tau);
        let nll_rec = rec_dev_nll(rec_dev, sigma);

        let depletion = b.iter().map(|&x| x / b0).collect();
        report.vector("B", b);
        report.vector("N", n);
        report.vector("R", r);
        report.vector("U", u);
        report.scalar("q", index_fit.q);
        report.scalar("h", h);
        report.scalar("B0", b0);
        report.scalar("R0", r0);
        report.scalar("nll_index", index_fit.nll);
        report.scalar("nll_rec", nll_rec);
        report.scalar("penalty", penalty);
        report.ad_vector("B_B0", depletion);

        Ok(index_fit.nll + nll_rec + penalty)
    }
}
