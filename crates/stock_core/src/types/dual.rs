//! Dual number type integration for automatic differentiation.
//!
//! This module provides type aliases for num-dual's first- and second-order
//! dual numbers. Objective functions written against `T: Float` run unchanged
//! under these types, so a single evaluation yields the value together with
//! a directional derivative (`DualNumber`) or a mixed second derivative
//! (`HyperDualNumber`).
//!
//! ## Usage
//!
//! ```
//! use stock_core::types::dual::DualNumber;
//! use stock_core::math::density::dnorm;
//!
//! // Seed d/dx on the observation
//! let x = DualNumber::new(1.0, 1.0);
//! let mu = DualNumber::from(0.0);
//! let sd = DualNumber::from(1.0);
//!
//! let ll = dnorm(x, mu, sd);
//!
//! // d/dx log N(x; 0, 1) = -x
//! assert!((ll.eps + 1.0).abs() < 1e-12);
//! ```

/// Type alias for num-dual's Dual64 (f64-based dual numbers).
///
/// This type supports first-order automatic differentiation with:
/// - `re`: Real part (function value)
/// - `eps`: Dual part (directional derivative)
pub type DualNumber = num_dual::Dual64;

/// Type alias for num-dual's HyperDual64.
///
/// Carries two independent infinitesimal directions:
/// - `re`: Real part (function value)
/// - `eps1`, `eps2`: First derivatives along each seeded direction
/// - `eps1eps2`: Mixed second derivative
pub type HyperDualNumber = num_dual::HyperDual64;
