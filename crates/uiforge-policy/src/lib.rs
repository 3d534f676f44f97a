//! uiforge permission aggregation.
//!
//! Every component descriptor carries its own access declarations;
//! this crate folds them into one consolidated `ModelAccess` policy
//! per model. The REST endpoint factory enforces that policy at
//! request time.

pub mod access;
pub mod aggregate;

pub use access::ModelAccess;
pub use aggregate::aggregate;
