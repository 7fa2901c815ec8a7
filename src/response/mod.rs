//! The adaptive two-phase response pipeline.

pub mod accumulator;
pub mod orchestrator;
pub mod report;

pub use accumulator::TrainingAccumulator;
pub use orchestrator::{Phase, ResponseOrchestrator};
pub use report::{ConvergenceRecord, RunSummary, SegmentSummary};
