//! Parameterized problem generation.
//!
//! A [`LinearSystemProvider`] turns a caller-supplied parameter vector into a
//! concrete sparse system `A x = b`. Each call hands back a fresh copy; the
//! provider never leaks a mutable handle to its base data.

use crate::error::Pod2gError;
use crate::matrix::CsrMatrix;

pub mod file;
pub mod perturbed;

pub use perturbed::PerturbedSystemProvider;

/// One concrete instance of the parameterized family.
pub struct LinearSystem {
    pub matrix: CsrMatrix<f64>,
    pub rhs: Vec<f64>,
}

impl LinearSystem {
    /// Matrix order; equals the right-hand-side length by construction.
    pub fn order(&self) -> usize {
        self.rhs.len()
    }
}

/// Builds a linear system for a given parameter vector.
///
/// `build` takes `&mut self` because drawing perturbations advances the
/// provider's owned random generator.
pub trait LinearSystemProvider {
    fn build(&mut self, parameters: &[f64]) -> Result<LinearSystem, Pod2gError>;
}
