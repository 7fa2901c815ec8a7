//! Surrogate models mapping parameter vectors to solution predictions.
//!
//! Training happens exactly once, after the training phase has accumulated
//! its samples; prediction before that is a sequencing bug, not a recoverable
//! condition.

use crate::error::Pod2gError;
use faer::MatRef;

pub mod pod_ffnn;

pub use pod_ffnn::{PodFfnnSurrogate, PodFfnnSurrogateBuilder};

/// A trainable parameters → solution approximation.
pub trait Surrogate {
    /// One-time training step. `parameters` and `solutions` carry one sample
    /// per row; an internal contiguous split provides the held-out set.
    /// Returns the held-out reconstruction loss.
    fn train_and_evaluate(
        &mut self,
        parameters: MatRef<'_, f64>,
        solutions: MatRef<'_, f64>,
    ) -> Result<f64, Pod2gError>;

    /// Predicts a solution-length vector; fails with
    /// [`Pod2gError::PreconditionViolation`] before training.
    fn predict(&self, parameters: &[f64]) -> Result<Vec<f64>, Pod2gError>;
}
