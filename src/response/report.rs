//! Per-call convergence records and run-level aggregation.

use std::fmt;

/// Outcome of one solve; appended to the orchestrator's log, never mutated.
#[derive(Clone, Debug)]
pub struct ConvergenceRecord {
    pub converged: bool,
    pub iterations: usize,
    /// Solver label; a failed call folds the failure into the label.
    pub solver: String,
}

/// Iteration statistics over one segment of the record log.
///
/// The iteration reductions only cover converged calls; `None` when the
/// segment has no converged call.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentSummary {
    pub calls: usize,
    pub unconverged: usize,
    pub min_iterations: Option<usize>,
    pub max_iterations: Option<usize>,
    pub mean_iterations: Option<f64>,
}

impl SegmentSummary {
    pub fn from_records(records: &[ConvergenceRecord]) -> Self {
        let converged: Vec<usize> =
            records.iter().filter(|r| r.converged).map(|r| r.iterations).collect();
        let min_iterations = converged.iter().copied().min();
        let max_iterations = converged.iter().copied().max();
        let mean_iterations = if converged.is_empty() {
            None
        } else {
            Some(converged.iter().sum::<usize>() as f64 / converged.len() as f64)
        };
        Self {
            calls: records.len(),
            unconverged: records.len() - converged.len(),
            min_iterations,
            max_iterations,
            mean_iterations,
        }
    }
}

/// Statistics split at the training → AI-enhanced boundary.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub training: SegmentSummary,
    pub ai_enhanced: SegmentSummary,
}

struct OrDash<T>(Option<T>);

impl<T: fmt::Display> fmt::Display for OrDash<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => write!(f, "{v}"),
            None => write!(f, "-"),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Min {}, max {}, avg {}, minAI {}, maxAI {}, avgAI {}, NC {}, NCAI {}",
            OrDash(self.training.min_iterations),
            OrDash(self.training.max_iterations),
            OrDash(self.training.mean_iterations),
            OrDash(self.ai_enhanced.min_iterations),
            OrDash(self.ai_enhanced.max_iterations),
            OrDash(self.ai_enhanced.mean_iterations),
            self.training.unconverged,
            self.ai_enhanced.unconverged,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(converged: bool, iterations: usize) -> ConvergenceRecord {
        ConvergenceRecord { converged, iterations, solver: "pcg".into() }
    }

    #[test]
    fn min_and_max_are_distinct_reductions() {
        let records = vec![rec(true, 3), rec(true, 9), rec(false, 12), rec(true, 6)];
        let s = SegmentSummary::from_records(&records);
        assert_eq!(s.calls, 4);
        assert_eq!(s.unconverged, 1);
        assert_eq!(s.min_iterations, Some(3));
        assert_eq!(s.max_iterations, Some(9));
        assert_eq!(s.mean_iterations, Some(6.0));
    }

    #[test]
    fn empty_segment_has_no_statistics() {
        let s = SegmentSummary::from_records(&[]);
        assert_eq!(s.calls, 0);
        assert_eq!(s.min_iterations, None);
        assert_eq!(s.mean_iterations, None);
    }

    #[test]
    fn display_renders_dashes_for_missing_values() {
        let summary = RunSummary {
            training: SegmentSummary::from_records(&[rec(true, 4)]),
            ai_enhanced: SegmentSummary::from_records(&[]),
        };
        let line = summary.to_string();
        assert!(line.starts_with("Min 4, max 4, avg 4"));
        assert!(line.contains("minAI -"));
    }
}
