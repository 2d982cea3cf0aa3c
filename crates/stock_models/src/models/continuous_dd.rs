//! Delay-difference model with continuous fishing and growth within the year.
//!
//! Recruits enter as a pulse at the start of each year. Within the year
//! numbers decay at `Z = M + F` and individual weight grows toward `Winf`
//! at Brody rate `κ`, which gives closed forms for end-of-year biomass and
//! for the biomass integral that links `F` to catch. Over a whole year the
//! dynamics reduce to the Deriso-Schnute recursion with `ρ = e^{-κ}`.
//!
//! # Data
//! `C_hist`, `I_hist`, `Kappa`, `Winf`, `wk`, `M`, `k`, `SR_type` (optional,
//! `"BH"`), `n_itF` (optional, 10).
//!
//! # Parameters
//! `R0x`, `transformed_h`, `log_sigma`, `log_tau`, `log_rec_dev` (ny).

use stock_core::bundle::{InputBundle, Report};
use stock_core::math::cast;
use stock_core::math::penalty::posfun;
use stock_core::traits::{Float, ObjectiveFunction};
use stock_core::types::ModelError;

use super::{iterations, switch};
use crate::dynamics::{bias_corrected, fit_index, rec_dev_nll, SRType, StockRecruit};

const CODE: &str = "cDD";

/// Upper bound on annual fishing mortality.
const F_MAX: f64 = 3.0;

/// Smoothing width of the `F_MAX` cap.
const F_CAP_EPS: f64 = 0.01;

/// Within-year state of one cohort aggregate.
#[derive(Clone, Copy, Debug)]
struct Year<T> {
    /// Numbers at the start of the year
    n: T,
    /// Biomass at the start of the year
    b: T,
    kappa: T,
    winf: T,
    m: T,
}

impl<T: Float> Year<T> {
    /// `∫₀¹ B(t) dt` under total mortality `z`.
    fn mean_biomass(&self, z: T) -> T {
        let kz = self.kappa + z;
        let wn = self.winf * self.n;
        self.b * (T::one() - (-kz).exp()) / kz
            + wn * ((T::one() - (-z).exp()) / z - (T::one() - (-kz).exp()) / kz)
    }

    /// Biomass and numbers at the end of the year, before recruitment.
    fn end(&self, z: T) -> (T, T) {
        let wn = self.winf * self.n;
        let survival = (-z).exp();
        let b = wn * survival + (self.b - wn) * (-(self.kappa + z)).exp();
        (b, self.n * survival)
    }

    /// Solve `C = F · ∫B` for `F` by fixed-point iteration, capped at `F_MAX`.
    fn solve_f(&self, catch: T, n_it: usize, penalty: &mut T) -> T {
        let f_max = cast::<T>(F_MAX);
        let cap = |f: T, pen: &mut T| f_max - posfun(f_max - f, cast(F_CAP_EPS), pen);

        let mut scratch = T::zero();
        let mut f = cap(catch / self.b, &mut scratch);
        for _ in 1..n_it {
            f = cap(catch / self.mean_biomass(self.m + f), &mut scratch);
        }
        cap(catch / self.mean_biomass(self.m + f), penalty)
    }
}

/// Continuous delay-difference objective.
///
/// # Mathematical Definition
/// ```text
/// N(t) = N·e^{-Zt}
/// B(t) = Winf·N·e^{-Zt} + (B - Winf·N)·e^{-(κ+Z)t}
/// ∫₀¹B = B·(1-e^{-(κ+Z)})/(κ+Z) + Winf·N·[(1-e^{-Z})/Z - (1-e^{-(κ+Z)})/(κ+Z)]
///
/// F_t solves C_t = F_t·∫B  (fixed point, n_itF iterations, F ≤ 3)
/// B_{t+1} = B(1) + wk·R_{t+1},  N_{t+1} = N(1) + R_{t+1}
///
/// nll = index(I, ∫B) + recdev(dev, σ) + penalty
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ContinuousDelayDifference;

impl ObjectiveFunction for ContinuousDelayDifference {
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
        let kappa = data.scalar("Kappa")?;
        let winf = data.scalar("Winf")?;
        let wk = data.scalar("wk")?;
        let m = data.scalar("M")?;
        let k = data.integer("k")?;
        let sr_type: SRType = switch(data, "SR_type", "BH", CODE)?;
        let n_it = iterations(data, "n_itF", 10, CODE)?;

        for (name, value) in [("Kappa", kappa), ("Winf", winf), ("M", m)] {
            if !(value > 0.0) {
                return Err(ModelError::invalid_data(
                    CODE,
                    format!("{} must be positive, got {}", name, value),
                ));
            }
        }
        if catch.iter().any(|&c| !(c.is_finite() && c >= 0.0)) {
            return Err(ModelError::invalid_data(CODE, "C_hist must be complete and non-negative"));
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

        let (kappa, winf, wk, m) = (cast::<T>(kappa), cast::<T>(winf), cast::<T>(wk), cast::<T>(m));
        let s0 = (-m).exp();
        let rho = (-kappa).exp();
        let alpha = winf * (T::one() - rho);
        let n0 = r0 / (T::one() - s0);
        let b0 = (s0 * alpha * n0 + wk * r0) / (T::one() - s0 * rho);
        let stock_recruit = StockRecruit::from_steepness(sr_type, h, b0 / r0, r0);

        let mut penalty = T::zero();
        let mut b = Vec::with_capacity(ny + 1);
        let mut n = Vec::with_capacity(ny + 1);
        let mut r = Vec::with_capacity(ny + 1);
        let mut f = Vec::with_capacity(ny);
        let mut b_mean = Vec::with_capacity(ny);
        b.push(b0);
        n.push(n0);
        r.push(r0);

        for t in 0..ny {
            let year = Year {
                n: n[t],
                b: b[t],
                kappa,
                winf,
                m,
            };
            let f_t = year.solve_f(cast(catch[t]), n_it, &mut penalty);
            let z = m + f_t;
            let (b_end, n_end) = year.end(z);

            let expected = if t + 1 >= k {
                stock_recruit.recruits(b[t + 1 - k])
            } else {
                r0
            };
            let recruits = expected * bias_corrected(rec_dev[t], sigma);

            f.push(f_t);
            b_mean.push(year.mean_biomass(z));
            b.push(b_end + wk * recruits);
            n.push(n_end + recruits);
            r.push(recruits);
        }

        let index_fit = fit_index(index, &b_mean, tau);
        let nll_rec = rec_dev_nll(rec_dev, sigma);

        let depletion = b.iter().map(|&x| x / b0).collect();
        report.vector("B", b);
        report.vector("Bbar", b_mean);
        report.vector("N", n);
        report.vector("R", r);
        report.vector("F", f);
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
