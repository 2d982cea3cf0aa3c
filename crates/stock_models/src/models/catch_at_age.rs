//! Statistical catch-at-age model.
//!
//! Annual fishing mortality is estimated as a free parameter per year and
//! catch is fitted, not conditioned on. Catch-at-age compositions are
//! multinomial; catch and index are lognormal.
//!
//! # Data
//! `C_hist` (ny), `I_hist` (ny), `CAA_hist` (ny × n_age proportions, NaN rows
//! missing), `CAA_n` (ny effective sample sizes), `weight`, `mat`, `M`
//! (scalar or per age), `SR_type` (optional, `"BH"`), `I_type` (optional,
//! `"B"`).
//!
//! # Parameters
//! `R0x`, `transformed_h`, `vul_par` (2), `log_F` (ny), `log_omega`,
//! `log_tau`, `log_sigma`, `log_early_rec_dev` (n_age - 1), `log_rec_dev` (ny).

use stock_core::bundle::{InputBundle, Report};
use stock_core::math::cast;
use stock_core::math::density::{dmultinom_kernel, sum_dnorm_log};
use stock_core::traits::{Float, ObjectiveFunction};
use stock_core::types::ModelError;

use super::switch;
use crate::dynamics::{
    advance_ages, age_schedule, baranov_catch, bias_corrected, fit_index, logistic_selectivity,
    natural_mortality, rec_dev_nll, spawners_per_recruit, sum_product, sum_product3,
    survivorship, IndexType, SRType, StockRecruit,
};

const CODE: &str = "SCA";

/// Statistical catch-at-age objective.
///
/// # Mathematical Definition
/// ```text
/// N_{0,a}   = R0·l_a·exp(early_a - σ²/2)                 a ≥ 1
/// N_{t,0}   = SR(E_{t-1})·exp(dev_t - σ²/2)               (R0 at t = 0)
/// F_{t,a}   = F_t·v_a,  Z_{t,a} = M_a + F_{t,a}
/// C_{t,a}   = F_{t,a}/Z_{t,a} · N_{t,a} · (1 - e^{-Z})
/// N_{t+1,a+1} = N_{t,a}·e^{-Z_{t,a}}                     (plus group)
///
/// nll = catch(C, ΣC·w; ω) + CAA multinomial + index + recdev + early recdev
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct StatisticalCatchAtAge;

impl ObjectiveFunction for StatisticalCatchAtAge {
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
        let caa = data.matrix("CAA_hist")?;
        let n_age = caa.cols;
        if n_age < 2 {
            return Err(ModelError::invalid_data(CODE, "at least two age classes are required"));
        }
        let caa = data.matrix_shape("CAA_hist", ny, n_age)?;
        let caa_n = data.vector_len("CAA_n", ny)?;
        let weight = age_schedule(data, "weight", n_age)?;
        let mat = age_schedule(data, "mat", n_age)?;
        let m = natural_mortality(data, n_age, CODE)?;
        let sr_type: SRType = switch(data, "SR_type", "BH", CODE)?;
        let index_type: IndexType = switch(data, "I_type", "B", CODE)?;

        let r0 = pars.scalar("R0x")?.exp();
        let h = sr_type.steepness(pars.scalar("transformed_h")?);
        let vul = logistic_selectivity(pars.vector_len("vul_par", 2)?, n_age);
        let log_f = pars.vector_len("log_F", ny)?;
        let omega = pars.scalar("log_omega")?.exp();
        let tau = pars.scalar("log_tau")?.exp();
        let sigma = pars.scalar("log_sigma")?.exp();
        let early_dev = pars.vector_len("log_early_rec_dev", n_age - 1)?;
        let rec_dev = pars.vector_len("log_rec_dev", ny)?;

        let l0 = survivorship(&m);
        let phi0 = cast::<T>(spawners_per_recruit(&l0, &weight, &mat));
        let e0 = r0 * phi0;
        let stock_recruit = StockRecruit::from_steepness(sr_type, h, phi0, r0);

        let weight: Vec<T> = weight.iter().map(|&w| cast(w)).collect();
        let mat: Vec<T> = mat.iter().map(|&x| cast(x)).collect();
        let m: Vec<T> = m.iter().map(|&x| cast(x)).collect();

        let mut n_row: Vec<T> = (0..n_age)
            .map(|a| {
                if a == 0 {
                    r0 * bias_corrected(rec_dev[0], sigma)
                } else {
                    r0 * cast::<T>(l0[a]) * bias_corrected(early_dev[a - 1], sigma)
                }
            })
            .collect();

        let mut n_mat = Vec::with_capacity((ny + 1) * n_age);
        let mut caa_pred = Vec::with_capacity(ny * n_age);
        let mut c_pred = Vec::with_capacity(ny);
        let mut f = Vec::with_capacity(ny);
        let mut total_b = Vec::with_capacity(ny + 1);
        let mut vuln_b = Vec::with_capacity(ny + 1);
        let mut ssb = Vec::with_capacity(ny + 1);

        let mut nll_caa = T::zero();
        for t in 0..=ny {
            total_b.push(sum_product(&n_row, &weight));
            vuln_b.push(sum_product3(&n_row, &weight, &vul));
            ssb.push(sum_product3(&n_row, &weight, &mat));
            n_mat.extend_from_slice(&n_row);
            if t == ny {
                break;
            }

            let f_t = log_f[t].exp();
            let z: Vec<T> = (0..n_age).map(|a| m[a] + f_t * vul[a]).collect();
            let caa_t: Vec<T> = (0..n_age)
                .map(|a| baranov_catch(f_t * vul[a], z[a], n_row[a]))
                .collect();
            c_pred.push(sum_product(&caa_t, &weight));
            f.push(f_t);

            let total = caa_t.iter().fold(T::zero(), |acc, &x| acc + x);
            let prop: Vec<T> = caa_t.iter().map(|&x| x / total).collect();
            nll_caa = nll_caa - dmultinom_kernel(caa.row(t), &prop, caa_n[t]);
            caa_pred.extend(caa_t);

            let mut next = advance_ages(&n_row, &z);
            next[0] = if t + 1 < ny {
                stock_recruit.recruits(ssb[t]) * bias_corrected(rec_dev[t + 1], sigma)
            } else {
                stock_recruit.recruits(ssb[t])
            };
            n_row = next;
        }

        let (ll_catch, _) = sum_dnorm_log(catch, &c_pred, omega);
        let nll_catch = -ll_catch;
        let surveyed = match index_type {
            IndexType::Biomass => &total_b,
            IndexType::VulnerableBiomass => &vuln_b,
            IndexType::SpawningBiomass => &ssb,
        };
        let index_fit = fit_index(index, &surveyed[..ny], tau);
        let nll_rec = rec_dev_nll(rec_dev, sigma) + rec_dev_nll(early_dev, sigma);

        let e_e0 = ssb.iter().map(|&e| e / e0).collect();
        report.matrix("N", ny + 1, n_age, n_mat);
        report.vector("B", total_b);
        report.vector("VB", vuln_b);
        report.vector("E", ssb);
        report.vector("F", f);
        report.vector("vul", vul);
        report.matrix("CAApred", ny, n_age, caa_pred);
        report.vector("Cpred", c_pred);
        report.scalar("q", index_fit.q);
        report.scalar("h", h);
        report.scalar("R0", r0);
        report.scalar("E0", e0);
        report.scalar("nll_catch", nll_catch);
        report.scalar("nll_caa", nll_caa);
        report.scalar("nll_index", index_fit.nll);
        report.scalar("nll_rec", nll_rec);
        report.ad_vector("E_E0", e_e0);

        Ok(nll_catch + nll_caa + index_fit.nll + nll_rec)
    }
}
