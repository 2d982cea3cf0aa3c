//! # Stock Models (L2: Objective Functions)
//!
//! Population-dynamics objective functions and the dispatcher that selects
//! one of them per evaluation.
//!
//! This crate provides:
//! - `ModelKey`: the closed set of supported models, and `ModelSelector`, the
//!   boundary type produced from a raw selector string
//! - The dispatcher (`models::dispatch`) routing a selector to exactly one
//!   objective function and returning its scalar unchanged
//! - Six objective functions: delay-difference, surplus production,
//!   statistical catch-at-age, virtual population analysis, continuous
//!   delay-difference, and the rapid conditioning model
//! - Shared population building blocks (`dynamics`)
//! - Gradient and Hessian extraction by re-running the same code path with
//!   dual numbers (`derivatives`)
//! - Parallel evaluation of independent jobs (`batch`)
//! - Small synthetic bundles for every model (`demo`)
//!
//! ## Design Principles
//!
//! - **Enum-based model selection** for static dispatch and exhaustive matching
//! - **Generic `Float` scalar** so plain and differentiated evaluation share code
//! - **Penalties instead of failures** for constraint violations, keeping the
//!   objective differentiable
//!
//! ## Example
//!
//! ```
//! use stock_models::demo;
//! use stock_models::models::{evaluate, ModelKey, ModelSelector};
//!
//! let bundle = demo::bundle_for(ModelKey::DelayDifference).unwrap();
//!
//! let dd = evaluate(&ModelSelector::parse("DD"), &bundle).unwrap();
//! assert!(dd.objective.is_finite());
//!
//! let unknown = evaluate(&ModelSelector::parse("unknown-model-xyz"), &bundle).unwrap();
//! assert_eq!(unknown.objective, 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod batch;
pub mod demo;
pub mod derivatives;
pub mod dynamics;
pub mod models;
