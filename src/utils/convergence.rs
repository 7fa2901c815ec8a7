//! Convergence tracking & tolerance checks for iterative solvers.

/// Stopping criteria & stats.
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}

impl<T: Copy + num_traits::Float> Convergence<T> {
    /// Returns (should_stop, stats) given current `res_norm` and iteration `i`.
    ///
    /// The relative residual decides convergence; exhausting the iteration
    /// budget stops the solve but does not count as converged.
    pub fn check(&self, res_norm: T, res0_norm: T, i: usize) -> (bool, SolveStats<T>) {
        let rel = if res0_norm > T::zero() {
            res_norm / res0_norm
        } else {
            res_norm
        };
        let converged = rel <= self.tol;
        let stop = converged || i >= self.max_iters;
        (
            stop,
            SolveStats {
                iterations: i,
                final_residual: res_norm,
                converged,
            },
        )
    }
}

/// Iteration cap as a fraction of the matrix order, rounded up and at least 1.
pub fn percentage_max_iterations(order: usize, fraction: f64) -> usize {
    ((order as f64 * fraction).ceil() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_hit_is_not_convergence() {
        let conv = Convergence { tol: 1e-6, max_iters: 3 };
        let (stop, stats) = conv.check(1.0, 1.0, 3);
        assert!(stop);
        assert!(!stats.converged);
    }

    #[test]
    fn relative_tolerance() {
        let conv = Convergence { tol: 1e-6, max_iters: 100 };
        let (stop, stats) = conv.check(5e-7, 1.0, 2);
        assert!(stop);
        assert!(stats.converged);
        assert_eq!(stats.iterations, 2);
    }

    #[test]
    fn percentage_cap_rounds_up() {
        assert_eq!(percentage_max_iterations(100, 0.2), 20);
        assert_eq!(percentage_max_iterations(5, 0.2), 1);
        assert_eq!(percentage_max_iterations(1, 0.2), 1);
        assert_eq!(percentage_max_iterations(11, 0.2), 3);
    }
}
