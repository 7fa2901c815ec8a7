//! pod2g: AI-accelerated solution of parameterized sparse linear systems
//!
//! This crate implements the POD2G response pipeline: a family of sparse
//! systems parameterized by a caller-supplied vector is first solved
//! classically (reorthogonalized PCG with a Jacobi preconditioner) while the
//! solutions are accumulated; a one-time reduction step then extracts a POD
//! basis from the accumulated snapshots, seeds a two-grid preconditioner with
//! it, and trains a surrogate that predicts initial guesses from parameters
//! alone. All later solves run in the AI-enhanced phase with the reduced-order
//! preconditioner and, optionally, surrogate-seeded starting points.

pub mod config;
pub mod core;
pub mod error;
pub mod matrix;
pub mod model;
pub mod preconditioner;
pub mod reduction;
pub mod response;
pub mod solver;
pub mod surrogate;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use core::*;
pub use error::*;
pub use matrix::*;
pub use model::*;
pub use preconditioner::*;
pub use reduction::*;
pub use response::*;
pub use solver::*;
pub use surrogate::*;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
