//! Parallel evaluation of independent model jobs.
//!
//! Every evaluation is a pure function of its selector and bundle, so jobs
//! are spread over the rayon pool with no shared state. Results come back in
//! job order and agree bit-for-bit with serial evaluation.
//!
//! # Example
//!
//! ```
//! use stock_models::batch::{BatchConfig, BatchEvaluator, BatchJob};
//! use stock_models::demo;
//! use stock_models::models::ModelSelector;
//!
//! let jobs: Vec<BatchJob> = demo::all_bundles().unwrap()
//!     .into_iter()
//!     .map(|(key, bundle)| BatchJob::new(ModelSelector::from(key), bundle))
//!     .collect();
//!
//! let evaluator = BatchEvaluator::new(BatchConfig::default());
//! let results = evaluator.evaluate(&jobs);
//! assert_eq!(results.len(), jobs.len());
//! assert!(results.iter().all(|r| r.is_ok()));
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use stock_core::bundle::InputBundle;
use stock_core::types::ModelError;
use tracing::debug;

use crate::models::{evaluate, Evaluation, ModelSelector};

/// One selector and the bundle to evaluate it on.
#[derive(Clone, Debug)]
pub struct BatchJob {
    /// Model selector.
    pub selector: ModelSelector,

    /// Data and parameters.
    pub bundle: InputBundle<f64>,
}

impl BatchJob {
    /// Creates a job.
    pub fn new(selector: ModelSelector, bundle: InputBundle<f64>) -> Self {
        Self { selector, bundle }
    }
}

/// Configuration for batch evaluation.
#[derive(Clone, Copy, Debug)]
pub struct BatchConfig {
    /// Minimum jobs per thread before the pool is used.
    pub min_jobs_per_thread: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_jobs_per_thread: 1,
        }
    }
}

impl BatchConfig {
    /// Creates a configuration with the given minimum jobs per thread.
    #[inline]
    pub fn with_min_jobs(min_jobs_per_thread: usize) -> Self {
        Self {
            min_jobs_per_thread,
        }
    }

    /// Whether `n_jobs` is enough work to go parallel.
    #[inline]
    pub fn should_parallelise(&self, n_jobs: usize) -> bool {
        n_jobs > 1 && n_jobs >= self.min_jobs_per_thread * rayon::current_num_threads()
    }
}

/// Evaluates batches of jobs, counting evaluations across calls.
#[derive(Debug, Default)]
pub struct BatchEvaluator {
    config: BatchConfig,
    evaluated: AtomicUsize,
}

impl BatchEvaluator {
    /// Creates an evaluator.
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            evaluated: AtomicUsize::new(0),
        }
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Total jobs evaluated by this evaluator.
    #[inline]
    pub fn evaluated(&self) -> usize {
        self.evaluated.load(Ordering::Relaxed)
    }

    /// Evaluates every job, returning results in job order.
    pub fn evaluate(&self, jobs: &[BatchJob]) -> Vec<Result<Evaluation<f64>, ModelError>> {
        let parallel = self.config.should_parallelise(jobs.len());
        debug!(n_jobs = jobs.len(), parallel, "evaluating batch");

        let run = |job: &BatchJob| {
            let result = evaluate(&job.selector, &job.bundle);
            self.evaluated.fetch_add(1, Ordering::Relaxed);
            result
        };
        if parallel {
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        }
    }
}

/// Evaluates every job with the default configuration.
pub fn evaluate_batch(jobs: &[BatchJob]) -> Vec<Result<Evaluation<f64>, ModelError>> {
    BatchEvaluator::new(BatchConfig::default()).evaluate(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::models::ModelKey;

    fn demo_jobs() -> Vec<BatchJob> {
        demo::all_bundles().unwrap()
            .into_iter()
            .map(|(key, bundle)| BatchJob::new(key.into(), bundle))
            .collect()
    }

    #[test]
    fn test_batch_matches_serial_in_order() {
        let jobs = demo_jobs();
        let batch = evaluate_batch(&jobs);
        for (job, result) in jobs.iter().zip(&batch) {
            let serial = evaluate::<f64>(&job.selector, &job.bundle).unwrap();
            let parallel = result.as_ref().unwrap();
            assert_eq!(serial.objective.to_bits(), parallel.objective.to_bits());
            assert_eq!(&serial.report, &parallel.report);
        }
    }

    #[test]
    fn test_errors_stay_with_their_job() {
        let mut jobs = demo_jobs();
        jobs.push(BatchJob::new(
            ModelKey::VirtualPopulationAnalysis.into(),
            demo::bundle_for(ModelKey::SurplusProduction).unwrap(),
        ));
        jobs.push(BatchJob::new(
            ModelSelector::parse("not-a-model"),
            demo::bundle_for(ModelKey::SurplusProduction).unwrap(),
        ));
        let results = evaluate_batch(&jobs);
        let n = results.len();
        assert!(results[..n - 2].iter().all(|r| r.is_ok()));
        assert!(results[n - 2].is_err());
        assert_eq!(results[n - 1].as_ref().unwrap().objective, 0.0);
    }

    #[test]
    fn test_evaluator_counts_jobs() {
        let evaluator = BatchEvaluator::new(BatchConfig::with_min_jobs(1000));
        let jobs = demo_jobs();
        assert!(!evaluator.config().should_parallelise(jobs.len()));
        evaluator.evaluate(&jobs);
        evaluator.evaluate(&jobs[..2]);
        assert_eq!(evaluator.evaluated(), jobs.len() + 2);
    }

    #[test]
    fn test_empty_batch() {
        assert!(evaluate_batch(&[]).is_empty());
    }
}
