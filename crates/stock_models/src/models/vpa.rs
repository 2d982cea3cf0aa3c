//! Virtual population analysis tuned to an abundance index.
//!
//! Numbers at age are reconstructed backwards from terminal-year
//! abundance using Pope's approximation; the free parameters are the
//! terminal numbers and the F ratio of the oldest age.
//!
//! # Data
//! `CAA_hist` (ny × n_age catch in numbers, n_age ≥ 3), `weight`, `M`
//! (scalar or per age), `I_hist` (ny).
//!
//! # Parameters
//! `log_N_terminal` (n_age), `log_F_ratio`, `log_tau`.

use stock_core::bundle::{InputBundle, Report};
use stock_core::math::cast;
use stock_core::math::penalty::posfun;
use stock_core::traits::{Float, ObjectiveFunction};
use stock_core::types::ModelError;

use crate::dynamics::{age_schedule, fit_index, sum_product};

const CODE: &str = "VPA";

/// Floor on terminal-year survival from fishing in Pope's equation.
const MIN_ESCAPEMENT: f64 = 0.01;

/// Floor on the oldest-age fishing mortality.
const MIN_F: f64 = 1e-8;

/// Virtual population analysis objective.
///
/// # Mathematical Definition
/// ```text
/// terminal year:  N_{Y,a} = exp(logN_a)
///                 F_{Y,a} = -ln posfun(1 - C_{Y,a}·e^{M/2} / N_{Y,a}, 0.01)
/// y < Y, a < A:   N_{y,a} = N_{y+1,a+1}·e^{M} + C_{y,a}·e^{M/2}
///                 F_{y,a} = ln(N_{y,a} / N_{y+1,a+1}) - M
/// y < Y, a = A:   F_{y,A} = ratio · (F_{y,A-2} + F_{y,A-1}) / 2
///                 N_{y,A} = C_{y,A} / (F/Z · (1 - e^{-Z}))
///
/// nll = index(I, Σ_a N·w) + penalty
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct VirtualPopulationAnalysis;

impl ObjectiveFunction for VirtualPopulationAnalysis {
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

        let caa = data.matrix("CAA_hist")?;
        let (ny, n_age) = (caa.rows, caa.cols);
        if ny == 0 {
            return Err(ModelError::invalid_data(CODE, "CAA_hist has no years"));
        }
        if n_age < 3 {
            return Err(ModelError::invalid_data(
                CODE,
                format!("at least three age classes are required, got {}", n_age),
            ));
        }
        if caa.values.iter().any(|&c| !(c.is_finite() && c >= 0.0)) {
            return Err(ModelError::invalid_data(
                CODE,
                "CAA_hist must be complete and non-negative",
            ));
        }
        if (0..ny - 1).any(|y| caa.get(y, n_age - 1) <= 0.0) {
            return Err(ModelError::invalid_data(
                CODE,
                "oldest-age catch must be positive before the terminal year",
            ));
        }
        let index = data.vector_len("I_hist", ny)?;
        let weight = age_schedule(data, "weight", n_age)?;
        let m = age_schedule(data, "M", n_age)?;

        let log_n_terminal = pars.vector_len("log_N_terminal", n_age)?;
        let f_ratio = pars.scalar("log_F_ratio")?.exp();
        let tau = pars.scalar("log_tau")?.exp();

        let at = |y: usize, a: usize| y * n_age + a;
        let half = cast::<T>(0.5);
        let mut penalty = T::zero();
        let mut n = vec![T::zero(); ny * n_age];
        let mut f = vec![T::zero(); ny * n_age];

        let last = ny - 1;
        for a in 0..n_age {
            let n_ya = log_n_terminal[a].exp();
            let ma = cast::<T>(m[a]);
            let removed = cast::<T>(caa.get(last, a)) * (half * ma).exp() / n_ya;
            let escapement = posfun(T::one() - removed, cast(MIN_ESCAPEMENT), &mut penalty);
            n[at(last, a)] = n_ya;
            f[at(last, a)] = -escapement.ln();
        }

        for y in (0..last).rev() {
            for a in 0..n_age - 1 {
                let ma = cast::<T>(m[a]);
                let survivors = n[at(y + 1, a + 1)];
                let n_ya = survivors * ma.exp() + cast::<T>(caa.get(y, a)) * (half * ma).exp();
                n[at(y, a)] = n_ya;
                f[at(y, a)] = (n_ya / survivors).ln() - ma;
            }

            let oldest = n_age - 1;
            let f_old = posfun(
                f_ratio * half * (f[at(y, oldest - 2)] + f[at(y, oldest - 1)]),
                cast(MIN_F),
                &mut penalty,
            );
            let z = cast::<T>(m[oldest]) + f_old;
            n[at(y, oldest)] = cast::<T>(caa.get(y, oldest)) / (f_old / z * (T::one() - (-z).exp()));
            f[at(y, oldest)] = f_old;
        }

        let weight: Vec<T> = weight.iter().map(|&w| cast(w)).collect();
        let biomass: Vec<T> = n.chunks(n_age).map(|row| sum_product(row, &weight)).collect();
        let index_fit = fit_index(index, &biomass, tau);

        report.matrix("N", ny, n_age, n);
        report.matrix("F", ny, n_age, f);
        report.vector("B", biomass);
        report.scalar("q", index_fit.q);
        report.scalar("nll_index", index_fit.nll);
        report.scalar("penalty", penalty);

        Ok(index_fit.nll + penalty)
    }
}
