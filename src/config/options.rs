//! Pipeline-level options.
//!
//! Collects the knobs of the two-phase response pipeline in one place:
//! how many POD components to retain, whether the AI-enhanced phase seeds the
//! initial guess from the surrogate, and the iterative-solve policy shared by
//! both phases.

use crate::surrogate::PodFfnnSurrogateBuilder;

/// Options consumed once when constructing a
/// [`crate::response::ResponseOrchestrator`].
#[derive(Clone, Debug)]
pub struct ResponseOptions {
    /// Retained principal components for the reduced-order preconditioner.
    pub principal_components: usize,

    /// Seed AI-enhanced solves with the surrogate's prediction.
    pub surrogate_seeding: bool,

    /// Relative residual tolerance of every solve.
    pub tolerance: f64,

    /// Iteration cap as a fraction of the matrix order.
    pub max_iterations_fraction: f64,

    /// Surrogate configuration, consumed at construction.
    pub surrogate: PodFfnnSurrogateBuilder,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            principal_components: 8,
            surrogate_seeding: false,
            tolerance: 1e-6,
            max_iterations_fraction: 0.2,
            surrogate: PodFfnnSurrogateBuilder::default(),
        }
    }
}
