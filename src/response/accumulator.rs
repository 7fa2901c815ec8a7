//! Training-phase sample accumulation and the one-time reduction step.

use crate::error::Pod2gError;
use crate::preconditioner::PodAmgFactory;
use crate::surrogate::{PodFfnnSurrogate, PodFfnnSurrogateBuilder, Surrogate};
use faer::Mat;

/// Collects (parameters, solution) pairs during the training phase and, on
/// demand, performs the reduction/training step exactly once: POD over the
/// accumulated solutions seeds the [`PodAmgFactory`], and the surrogate is
/// fitted to the parameter → solution map.
///
/// After a successful [`TrainingAccumulator::train_from_registered`] the
/// accumulator exclusively owns the reduced basis and the trained surrogate
/// and hands out read-only handles. On failure nothing is published.
pub struct TrainingAccumulator {
    parameters: Vec<Vec<f64>>,
    solutions: Vec<Vec<f64>>,
    principal_components: usize,
    factory: PodAmgFactory,
    surrogate: PodFfnnSurrogate,
    trained: bool,
}

impl TrainingAccumulator {
    pub fn new(principal_components: usize, surrogate: PodFfnnSurrogateBuilder) -> Self {
        Self {
            parameters: Vec::new(),
            solutions: Vec::new(),
            principal_components,
            factory: PodAmgFactory::new(),
            surrogate: surrogate.build(),
            trained: false,
        }
    }

    /// Appends one sample. Consistency is checked at reduction time, not here.
    pub fn register(&mut self, parameters: &[f64], solution: &[f64]) {
        self.parameters.push(parameters.to_vec());
        self.solutions.push(solution.to_vec());
    }

    pub fn num_registered(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// The one-time reduction/training step.
    pub fn train_from_registered(&mut self) -> Result<(), Pod2gError> {
        if self.trained {
            return Err(Pod2gError::InconsistentTrainingData(
                "training already completed; retraining is not supported".into(),
            ));
        }
        let num_samples = self.solutions.len();
        if num_samples == 0 {
            return Err(Pod2gError::InconsistentTrainingData(
                "no solutions have been registered".into(),
            ));
        }
        let num_dofs = self.solutions[0].len();
        if let Some(bad) = self.solutions.iter().find(|s| s.len() != num_dofs) {
            return Err(Pod2gError::InconsistentTrainingData(format!(
                "registered solutions have mixed lengths ({} vs {})",
                num_dofs,
                bad.len()
            )));
        }
        if self.parameters.len() != num_samples {
            return Err(Pod2gError::InconsistentTrainingData(format!(
                "have gathered {} sets of model parameters, but {} solution vectors",
                self.parameters.len(),
                num_samples
            )));
        }
        let num_parameters = self.parameters[0].len();
        if self.parameters.iter().any(|p| p.len() != num_parameters) {
            return Err(Pod2gError::InconsistentTrainingData(
                "the model parameter sets do not all have the same size".into(),
            ));
        }

        // solutions as columns of the snapshot matrix
        let snapshots = Mat::from_fn(num_dofs, num_samples, |i, j| self.solutions[j][i]);
        // raw vectors are not needed again once assembled
        self.solutions.clear();
        self.solutions.shrink_to_fit();

        self.factory.initialize(snapshots.as_ref(), self.principal_components)?;

        // surrogate wants samples as rows
        let params = Mat::from_fn(num_samples, num_parameters, |i, j| self.parameters[i][j]);
        let solutions_t = snapshots.transpose().to_owned();
        self.surrogate.train_and_evaluate(params.as_ref(), solutions_t.as_ref())?;

        self.trained = true;
        Ok(())
    }

    /// Read-only handle to the initialized preconditioner factory.
    pub fn preconditioner_factory(&self) -> Result<&PodAmgFactory, Pod2gError> {
        if !self.trained {
            return Err(Pod2gError::PreconditionViolation(
                "reduced-order preconditioner requested before the training step",
            ));
        }
        Ok(&self.factory)
    }

    /// Read-only handle to the trained surrogate.
    pub fn surrogate(&self) -> Result<&PodFfnnSurrogate, Pod2gError> {
        if !self.trained {
            return Err(Pod2gError::PreconditionViolation(
                "surrogate requested before the training step",
            ));
        }
        Ok(&self.surrogate)
    }
}
