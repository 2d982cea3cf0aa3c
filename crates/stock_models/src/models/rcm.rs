//! Rapid conditioning model: age-structured, multi-fleet, conditioned on catch.
//!
//! Each fleet's annual fishing mortality is solved from its observed catch
//! rather than estimated, so the free parameters are unfished recruitment,
//! steepness, selectivity and recruitment deviations.
//!
//! # Data
//! `C_hist` (ny × nfleet matrix, or a vector for one fleet), `I_hist` (ny),
//! `n_age`, `weight`, `mat`, `M` (scalar or per age), `CAA_hist` (optional,
//! ny × n_age, first fleet) with `CAA_n`, `SR_type` (optional, `"BH"`),
//! `I_type` (optional, `"B"`), `n_itF` (optional, 10).
//!
//! # Parameters
//! `R0x`, `transformed_h`, `vul_par` (2 per fleet), `log_tau`, `log_sigma`,
//! `log_rec_dev` (ny).

use stock_core::bundle::{DataSet, DataValue, InputBundle, Matrix, Report};
use stock_core::math::cast;
use stock_core::math::density::dmultinom_kernel;
use stock_core::math::penalty::posfun;
use stock_core::traits::{Float, ObjectiveFunction};
use stock_core::types::ModelError;

use super::{iterations, switch};
use crate::dynamics::{
    advance_ages, age_schedule, bias_corrected, fit_index, logistic_selectivity,
    natural_mortality, rec_dev_nll, spawners_per_recruit, sum_product, sum_product3,
    survivorship, IndexType, SRType, StockRecruit,
};

const CODE: &str = "RCM";

/// Upper bound on fleet fishing mortality.
const F_MAX: f64 = 3.0;

/// Smoothing width of the `F_MAX` cap.
const F_CAP_EPS: f64 = 0.01;

/// Catch by year and fleet. A plain vector is a single fleet.
fn fleet_catch(data: &DataSet) -> Result<Matrix, ModelError> {
    match data.get("C_hist") {
        Some(DataValue::Vector(v)) => Ok(Matrix {
            rows: v.len(),
            cols: 1,
            values: v.clone(),
        }),
        _ => Ok(data.matrix("C_hist")?.clone()),
    }
}

/// Per-fleet fishing mortality for one year.
struct FleetSolver<'a, T> {
    n: &'a [T],
    m: &'a [T],
    weight: &'a [T],
    vul: &'a [Vec<T>],
}

impl<T: Float> FleetSolver<'_, T> {
    fn mortality(&self, f: &[T]) -> Vec<T> {
        (0..self.n.len())
            .map(|a| {
                f.iter()
                    .zip(self.vul)
                    .fold(self.m[a], |z, (&f_k, v)| z + f_k * v[a])
            })
            .collect()
    }

    /// Solve `C_f = F_f · Σ_a v_fa·N_a·w_a·(1 - e^{-Z_a})/Z_a` jointly for all
    /// fleets by fixed-point iteration.
    fn solve(&self, catch: &[f64], n_it: usize, penalty: &mut T) -> Vec<T> {
        let f_max = cast::<T>(F_MAX);
        let cap = |f: T, pen: &mut T| f_max - posfun(f_max - f, cast(F_CAP_EPS), pen);

        let mut scratch = T::zero();
        let mut f: Vec<T> = catch
            .iter()
            .zip(self.vul)
            .map(|(&c, v)| cap(cast::<T>(c) / sum_product3(self.n, self.weight, v), &mut scratch))
            .collect();

        for it in 0..n_it {
            let z = self.mortality(&f);
            let exposed: Vec<T> = (0..self.n.len())
                .map(|a| self.n[a] * self.weight[a] * (T::one() - (-z[a]).exp()) / z[a])
                .collect();
            let last = it + 1 == n_it;
            f = catch
                .iter()
                .zip(self.vul)
                .map(|(&c, v)| {
                    let raw = cast::<T>(c) / sum_product(&exposed, v);
                    if last {
                        cap(raw, &mut *penalty)
                    } else {
                        cap(raw, &mut scratch)
                    }
                })
                .collect();
        }
        f
    }
}

/// Rapid conditioning model objective.
///
/// # Mathematical Definition
/// ```text
/// N_{0,a}   = R0·l_a                          (unfished start)
/// N_{t,0}   = SR(E_{t-1})·exp(dev_t - σ²/2)
/// Z_{t,a}   = M_a + Σ_f F_{t,f}·v_{f,a}
/// F_{t,f}   solves C_{t,f} = F_{t,f}·Σ_a v_{f,a}·N_{t,a}·w_a·(1 - e^{-Z})/Z
///
/// nll = index + CAA multinomial (fleet 1) + recdev + penalty
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RapidConditioning;

impl ObjectiveFunction for RapidConditioning {
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

        let catch = fleet_catch(data)?;
        let (ny, n_fleet) = (catch.rows, catch.cols);
        if ny == 0 || n_fleet == 0 {
            return Err(ModelError::invalid_data(CODE, "C_hist is empty"));
        }
        if catch.values.iter().any(|&c| !(c.is_finite() && c >= 0.0)) {
            return Err(ModelError::invalid_data(CODE, "C_hist must be complete and non-negative"));
        }
        let index = data.vector_len("I_hist", ny)?;
        let n_age = data.integer("n_age")?;
        if n_age < 2 {
            return Err(ModelError::invalid_data(CODE, "at least two age classes are required"));
        }
        let n_age = n_age as usize;
        let weight = age_schedule(data, "weight", n_age)?;
        let mat = age_schedule(data, "mat", n_age)?;
        let m = natural_mortality(data, n_age, CODE)?;
        let composition = if data.contains("CAA_hist") {
            Some((
                data.matrix_shape("CAA_hist", ny, n_age)?,
                data.vector_len("CAA_n", ny)?,
            ))
        } else {
            None
        };
        let sr_type: SRType = switch(data, "SR_type", "BH", CODE)?;
        let index_type: IndexType = switch(data, "I_type", "B", CODE)?;
        let n_it = iterations(data, "n_itF", 10, CODE)?;

        let r0 = pars.scalar("R0x")?.exp();
        let h = sr_type.steepness(pars.scalar("transformed_h")?);
        let vul_par = pars.vector_len("vul_par", 2 * n_fleet)?;
        let tau = pars.scalar("log_tau")?.exp();
        let sigma = pars.scalar("log_sigma")?.exp();
        let rec_dev = pars.vector_len("log_rec_dev", ny)?;

        let vul: Vec<Vec<T>> = vul_par
            .chunks(2)
            .map(|p| logistic_selectivity(p, n_age))
            .collect();

        let l0 = survivorship(&m);
        let phi0 = cast::<T>(spawners_per_recruit(&l0, &weight, &mat));
        let e0 = r0 * phi0;
        let stock_recruit = StockRecruit::from_steepness(sr_type, h, phi0, r0);

        let weight: Vec<T> = weight.iter().map(|&w| cast(w)).collect();
        let mat: Vec<T> = mat.iter().map(|&x| cast(x)).collect();
        let m: Vec<T> = m.iter().map(|&x| cast(x)).collect();

        let mut n_row: Vec<T> = l0.iter().map(|&l| r0 * cast::<T>(l)).collect();
        n_row[0] = n_row[0] * bias_corrected(rec_dev[0], sigma);

        let mut penalty = T::zero();
        let mut nll_caa = T::zero();
        let mut n_mat = Vec::with_capacity((ny + 1) * n_age);
        let mut f_mat = Vec::with_capacity(ny * n_fleet);
        let mut caa_pred = Vec::with_capacity(ny * n_age);
        let mut total_b = Vec::with_capacity(ny + 1);
        let mut vuln_b = Vec::with_capacity(ny + 1);
        let mut ssb = Vec::with_capacity(ny + 1);

        for t in 0..=ny {
            total_b.push(sum_product(&n_row, &weight));
            vuln_b.push(sum_product3(&n_row, &weight, &vul[0]));
            ssb.push(sum_product3(&n_row, &weight, &mat));
            n_mat.extend_from_slice(&n_row);
            if t == ny {
                break;
            }

            let solver = FleetSolver {
                n: &n_row,
                m: &m,
                weight: &weight,
                vul: &vul,
            };
            let f_t = solver.solve(catch.row(t), n_it, &mut penalty);
            let z = solver.mortality(&f_t);

            // Catch at age of the first fleet
            let caa_t: Vec<T> = (0..n_age)
                .map(|a| f_t[0] * vul[0][a] / z[a] * n_row[a] * (T::one() - (-z[a]).exp()))
                .collect();
            if let Some((caa_obs, caa_n)) = composition {
                // A year with no first-fleet catch has no predicted composition
                let total = caa_t.iter().fold(T::zero(), |acc, &x| acc + x);
                if total > T::zero() && caa_n[t] > 0.0 {
                    let prop: Vec<T> = caa_t.iter().map(|&x| x / total).collect();
                    nll_caa = nll_caa - dmultinom_kernel(caa_obs.row(t), &prop, caa_n[t]);
                }
            }
            caa_pred.extend(caa_t);
            f_mat.extend(f_t);

            let mut next = advance_ages(&n_row, &z);
            next[0] = if t + 1 < ny {
                stock_recruit.recruits(ssb[t]) * bias_corrected(rec_dev[t + 1], sigma)
            } else {
                stock_recruit.recruits(ssb[t])
            };
            n_row = next;
        }

        let surveyed = match index_type {
            IndexType::Biomass => &total_b,
            IndexType::VulnerableBiomass => &vuln_b,
            IndexType::SpawningBiomass => &ssb,
        };
        let index_fit = fit_index(index, &surveyed[..ny], tau);
        let nll_rec = rec_dev_nll(rec_dev, sigma);

        let e_e0 = ssb.iter().map(|&e| e / e0).collect();
        report.matrix("N", ny + 1, n_age, n_mat);
        report.matrix("F", ny, n_fleet, f_mat);
        report.matrix("CAApred", ny, n_age, caa_pred);
        report.vector("B", total_b);
        report.vector("VB", vuln_b);
        report.vector("E", ssb);
        report.scalar("q", index_fit.q);
        report.scalar("h", h);
        report.scalar("R0", r0);
        report.scalar("E0", e0);
        report.scalar("nll_index", index_fit.nll);
        report.scalar("nll_caa", nll_caa);
        report.scalar("nll_rec", nll_rec);
        report.scalar("penalty", penalty);
        report.ad_vector("E_E0", e_e0);

        Ok(index_fit.nll + nll_caa + nll_rec + penalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::models::ModelKey;
    use approx::assert_relative_eq;

    fn demo_bundle() -> InputBundle<f64> {
        demo::bundle_for(ModelKey::RapidConditioningModel).unwrap()
    }

    #[test]
    fn test_demo_objective_finite() {
        let mut report = Report::new();
        let nll = RapidConditioning.objective(&demo_bundle(), &mut report).unwrap();
        assert!(nll.is_finite());
        assert!(report.non_finite().is_empty());
    }

    #[test]
    fn test_conditioned_catch_is_reproduced() {
        let bundle = demo_bundle().with_data("n_itF", 50_i64);
        let mut report = Report::new();
        RapidConditioning.objective(&bundle, &mut report).unwrap();

        let data = bundle.data();
        let catch = data.matrix("C_hist").unwrap();
        let n_age = data.integer("n_age").unwrap() as usize;
        let weight = data.vector("weight").unwrap();
        let m = data.scalar("M").unwrap();
        let vul_par = bundle.parameters().vector("vul_par").unwrap();
        let vul: Vec<Vec<f64>> = vul_par
            .chunks(2)
            .map(|p| logistic_selectivity(p, n_age))
            .collect();
        let n = report.get_slice("N").unwrap();
        let f = report.get_slice("F").unwrap();

        let t = 5;
        let row = &n[t * n_age..(t + 1) * n_age];
        let f_t = &f[t * catch.cols..(t + 1) * catch.cols];
        for fleet in 0..catch.cols {
            let predicted: f64 = (0..n_age)
                .map(|a| {
                    let z = m + (0..catch.cols).map(|k| f_t[k] * vul[k][a]).sum::<f64>();
                    f_t[fleet] * vul[fleet][a] / z * row[a] * weight[a] * (1.0 - (-z).exp())
                })
                .sum();
            assert_relative_eq!(predicted, catch.get(t, fleet), max_relative = 1e-6);
        }
    }

    #[test]
    fn test_single_fleet_vector_catch() {
        let bundle = demo_bundle();
        let catch = bundle.data().matrix("C_hist").unwrap();
        let first: Vec<f64> = (0..catch.rows).map(|t| catch.get(t, 0)).collect();
        let single = bundle
            .clone()
            .with_data("C_hist", first)
            .with_parameter("vul_par", bundle.parameters().vector("vul_par").unwrap()[..2].to_vec());
        let mut report = Report::new();
        let nll = RapidConditioning.objective(&single, &mut report).unwrap();
        assert!(nll.is_finite());
        if let Some(stock_core::bundle::ReportValue::Matrix { cols, .. }) = report.get("F") {
            assert_eq!(*cols, 1);
        } else {
            panic!("F should be a matrix");
        }
    }

    #[test]
    fn test_composition_optional() {
        let (full, params) = demo_bundle().into_parts();
        let mut data = DataSet::new();
        for name in full.names().filter(|n| *n != "CAA_hist" && *n != "CAA_n") {
            if let Some(value) = full.get(name) {
                data.insert(name, value.clone());
            }
        }
        let mut report = Report::new();
        let nll = RapidConditioning
            .objective(&InputBundle::new(data, params), &mut report)
            .unwrap();
        assert!(nll.is_finite());
        assert_eq!(report.get_scalar("nll_caa"), Some(0.0));
    }

    #[test]
    fn test_zero_first_fleet_catch_skips_composition() {
        let bundle = demo_bundle();
        let mut catch = bundle.data().matrix("C_hist").unwrap().clone();
        let cols = catch.cols;
        catch.values[4 * cols] = 0.0;
        let closed = bundle.clone().with_data("C_hist", catch);

        let mut report = Report::new();
        let nll = RapidConditioning.objective(&closed, &mut report).unwrap();
        assert!(nll.is_finite());
        assert!(report.get_scalar("nll_caa").unwrap().is_finite());
        assert_eq!(report.get_slice("F").unwrap()[4 * cols], 0.0);
        assert!(report.non_finite().is_empty());
    }

    #[test]
    fn test_zero_natural_mortality_rejected() {
        let bundle = demo_bundle().with_data("M", 0.0);
        let err = RapidConditioning
            .objective(&bundle, &mut Report::new())
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidData { model: "RCM", .. }));
    }

    #[test]
    fn test_vul_par_length_follows_fleets() {
        let bundle = demo_bundle().with_parameter("vul_par", vec![1.0, 0.5]);
        let err = RapidConditioning
            .objective(&bundle, &mut Report::new())
            .unwrap_err();
        assert!(err.is_bundle_error());
    }
}
