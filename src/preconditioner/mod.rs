//! Preconditioners for the response pipeline.
//!
//! The training phase uses a plain Jacobi preconditioner rebuilt per call; the
//! AI-enhanced phase reuses a single [`PodAmg`] two-grid preconditioner whose
//! coarse space is seeded from the POD basis of the training solutions.

use crate::error::Pod2gError;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<M, V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), Pod2gError>;
    /// Optionally: setup/factorize from A
    fn setup(&mut self, _a: &M) -> Result<(), Pod2gError> {
        Ok(())
    }
}

pub mod gauss_seidel;
pub mod jacobi;
pub mod pod_amg;

pub use gauss_seidel::{GaussSeidel, SweepFlags};
pub use jacobi::Jacobi;
pub use pod_amg::{PodAmg, PodAmgFactory};
