//! Two-phase response orchestration.
//!
//! The orchestrator drives one solve per call: it builds the concrete system
//! for the caller's parameters, picks preconditioner and initial guess for
//! the requested phase, runs PCG, and appends one convergence record per call
//! whatever the outcome. A non-converging solve is absorbed into the record
//! and the best-effort iterate is returned; only input and sequencing errors
//! abort a call.

use crate::config::ResponseOptions;
use crate::core::traits::Diagonal;
use crate::error::Pod2gError;
use crate::matrix::CsrMatrix;
use crate::model::LinearSystemProvider;
use crate::preconditioner::{Jacobi, Preconditioner};
use crate::response::accumulator::TrainingAccumulator;
use crate::response::report::{ConvergenceRecord, RunSummary, SegmentSummary};
use crate::solver::{LinearSolver, PcgSolver};
use crate::surrogate::Surrogate;
use crate::utils::convergence::percentage_max_iterations;

/// Operating phase of the pipeline. The only allowed transition is
/// `Training → AiEnhanced`, performed once by
/// [`ResponseOrchestrator::train_from_registered`]; it is irreversible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Training,
    AiEnhanced,
}

pub struct ResponseOrchestrator<P> {
    provider: P,
    options: ResponseOptions,
    accumulator: TrainingAccumulator,
    records: Vec<ConvergenceRecord>,
    training_calls: usize,
    phase: Phase,
}

impl<P: LinearSystemProvider> ResponseOrchestrator<P> {
    pub fn new(provider: P, options: ResponseOptions) -> Self {
        let accumulator =
            TrainingAccumulator::new(options.principal_components, options.surrogate.clone());
        Self {
            provider,
            options,
            accumulator,
            records: Vec::new(),
            training_calls: 0,
            phase: Phase::Training,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Stores a training-phase response for the later reduction step.
    pub fn register(&mut self, parameters: &[f64], solution: &[f64]) -> Result<(), Pod2gError> {
        if self.phase != Phase::Training {
            return Err(Pod2gError::PreconditionViolation(
                "samples cannot be registered after the training step",
            ));
        }
        self.accumulator.register(parameters, solution);
        Ok(())
    }

    /// One-time reduction/training step; switches the phase on success.
    pub fn train_from_registered(&mut self) -> Result<(), Pod2gError> {
        if self.phase == Phase::AiEnhanced {
            return Err(Pod2gError::PreconditionViolation(
                "the training step has already run",
            ));
        }
        self.accumulator.train_from_registered()?;
        self.phase = Phase::AiEnhanced;
        Ok(())
    }

    /// Solves the system derived from `parameters` in the requested phase and
    /// returns the solution values.
    pub fn respond(&mut self, parameters: &[f64], phase: Phase) -> Result<Vec<f64>, Pod2gError> {
        match (phase, self.phase) {
            (Phase::AiEnhanced, Phase::Training) => {
                return Err(Pod2gError::PreconditionViolation(
                    "AI-enhanced response requested before the training step",
                ));
            }
            (Phase::Training, Phase::AiEnhanced) => {
                return Err(Pod2gError::PreconditionViolation(
                    "training response requested after the phase transition",
                ));
            }
            _ => {}
        }

        let system = self.provider.build(parameters)?;
        let order = system.order();
        let max_iters = percentage_max_iterations(order, self.options.max_iterations_fraction);

        let ai_enhanced = phase == Phase::AiEnhanced;
        let seeded = ai_enhanced && self.options.surrogate_seeding;

        let (pc, label): (Box<dyn Preconditioner<CsrMatrix<f64>, Vec<f64>>>, &str) =
            if ai_enhanced {
                let factory = self.accumulator.preconditioner_factory()?;
                let pc = factory.create(&system.matrix)?;
                (Box::new(pc), if seeded { "pcg/pod-amg/surrogate" } else { "pcg/pod-amg" })
            } else {
                self.training_calls += 1;
                let pc = Jacobi::from_diagonal(&system.matrix.diagonal())?;
                (Box::new(pc), "reorthogonalized-pcg/jacobi")
            };

        let mut x = if seeded {
            let guess = self.accumulator.surrogate()?.predict(parameters)?;
            if guess.len() != order {
                return Err(Pod2gError::InvalidInput(format!(
                    "surrogate prediction has length {}, system order is {}",
                    guess.len(),
                    order
                )));
            }
            guess
        } else {
            vec![0.0; order]
        };

        // full classical mode reorthogonalizes; accelerated modes trade that
        // robustness for speed
        let reorthogonalize = !ai_enhanced && !self.options.surrogate_seeding;
        let mut solver = PcgSolver::new(self.options.tolerance, max_iters)
            .with_reorthogonalization(reorthogonalize);

        let record = match solver.solve(&system.matrix, Some(pc.as_ref()), &system.rhs, &mut x) {
            Ok(stats) => ConvergenceRecord {
                converged: stats.converged,
                iterations: stats.iterations,
                solver: label.to_string(),
            },
            Err(err) => ConvergenceRecord {
                converged: false,
                iterations: 0,
                solver: format!("{label} - {err}"),
            },
        };
        log::debug!(
            "pcg iterations = {}, dofs = {}, converged = {}",
            record.iterations,
            order,
            record.converged
        );
        self.records.push(record);
        Ok(x)
    }

    pub fn records(&self) -> &[ConvergenceRecord] {
        &self.records
    }

    /// Aggregates the record log, split at the tracked training-call boundary.
    pub fn summary(&self) -> RunSummary {
        let split = self.training_calls.min(self.records.len());
        RunSummary {
            training: SegmentSummary::from_records(&self.records[..split]),
            ai_enhanced: SegmentSummary::from_records(&self.records[split..]),
        }
    }
}
