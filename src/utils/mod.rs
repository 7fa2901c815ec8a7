//! Shared solver utilities.

pub mod convergence;

pub use convergence::{Convergence, SolveStats, percentage_max_iterations};
