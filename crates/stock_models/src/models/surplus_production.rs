//! Pella-Tomlinson surplus production model conditioned on catch.
//!
//! # Data
//! `C_hist`, `I_hist`.
//!
//! # Parameters
//! `log_FMSY`, `MSYx` (log MSY), `log_dep` (initial depletion `B_0/K`),
//! `log_n` (production shape), `log_tau`.

use stock_core::bundle::{InputBundle, Report};
use stock_core::math::cast;
use stock_core::math::penalty::posfun;
use stock_core::traits::{Float, ObjectiveFunction};
use stock_core::types::ModelError;

use crate::dynamics::fit_index;

const CODE: &str = "SP";

/// Shape parameters this close to one use the Fox form.
const FOX_TOLERANCE: f64 = 1e-6;

/// Biomass floor as a fraction of carrying capacity.
const MIN_DEPLETION: f64 = 1e-3;

/// Pella-Tomlinson production curve parameterised by `(MSY, BMSY, n)`.
#[derive(Clone, Copy, Debug)]
struct Production<T> {
    msy: T,
    k: T,
    n: T,
    gamma: T,
    fox: bool,
}

impl<T: Float> Production<T> {
    fn new(msy: T, bmsy: T, n: T) -> Self {
        let fox = (n - T::one()).abs() < cast(FOX_TOLERANCE);
        if fox {
            let e = cast::<T>(std::f64::consts::E);
            Self {
                msy,
                k: bmsy * e,
                n,
                gamma: e,
                fox,
            }
        } else {
            let n_minus_one = n - T::one();
            Self {
                msy,
                // BMSY / K = n^(1 / (1 - n))
                k: bmsy / n.powf(T::one() / (T::one() - n)),
                n,
                gamma: n.powf(n / n_minus_one) / n_minus_one,
                fox,
            }
        }
    }

    /// Surplus production at biomass `b`.
    fn surplus(&self, b: T) -> T {
        let x = b / self.k;
        if self.fox {
            -self.gamma * self.msy * x * x.ln()
        } else {
            self.gamma * self.msy * (x - x.powf(self.n))
        }
    }
}

/// Pella-Tomlinson surplus production objective.
///
/// # Mathematical Definition
/// ```text
/// BMSY = MSY / FMSY,  K = BMSY / n^(1/(1-n)),  γ = n^(n/(n-1)) / (n-1)
/// P(B) = γ·MSY·(B/K - (B/K)^n)               (-e·MSY·(B/K)·ln(B/K) as n → 1)
///
/// B_0     = dep·K
/// B_{t+1} = posfun(B_t + P(B_t) - C_t, 0.001·K)
///
/// nll = index(I, B) + penalty
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SurplusProduction;

impl ObjectiveFunction for SurplusProduction {
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

        let fmsy = pars.scalar("log_FMSY")?.exp();
        let msy = pars.scalar("MSYx")?.exp();
        let dep = pars.scalar("log_dep")?.exp();
        let n = pars.scalar("log_n")?.exp();
        let tau = pars.scalar("log_tau")?.exp();

        let bmsy = msy / fmsy;
        let production = Production::new(msy, bmsy, n);
        let k = production.k;
        let floor = cast::<T>(MIN_DEPLETION) * k;

        let mut penalty = T::zero();
        let mut b = Vec::with_capacity(ny + 1);
        b.push(dep * k);
        for t in 0..ny {
            let next = b[t] + production.surplus(b[t]) - cast::<T>(catch[t]);
            b.push(posfun(next, floor, &mut penalty));
        }

        let index_fit = fit_index(index, &b[..ny], tau);

        let b_bmsy = b.iter().map(|&x| x / bmsy).collect();
        report.vector("B", b);
        report.scalar("K", k);
        report.scalar("BMSY", bmsy);
        report.scalar("FMSY", fmsy);
        report.scalar("MSY", msy);
        report.scalar("n", n);
        report.scalar("q", index_fit.q);
        report.scalar("nll_index", index_fit.nll);
        report.scalar("penalty", penalty);
        report.ad_vector("B_BMSY", b_bmsy);

        Ok(index_fit.nll + penalty)
    }
}
