//! Multiplicative perturbation of a fixed base system.

use crate::error::Pod2gError;
use crate::matrix::CsrMatrix;
use crate::model::{LinearSystem, LinearSystemProvider};
use rand::Rng;
use rand::rngs::StdRng;

/// Produces perturbed instances of a base system.
///
/// Matrix values are scaled by `1 + factor·(1 + noise·(u − ½))` where `factor`
/// is the first parameter component and `u` is drawn per nonzero from the
/// owned generator; right-hand-side entries are scaled by an independent
/// `1 + rhs_randomness·(u − ½)` term. The generator is passed in at
/// construction and never reseeded, so successive builds of the same
/// parameters differ unless both noise levels are zero.
pub struct PerturbedSystemProvider {
    base_matrix: CsrMatrix<f64>,
    base_rhs: Vec<f64>,
    noise: f64,
    rhs_randomness: f64,
    rng: StdRng,
}

impl PerturbedSystemProvider {
    /// Wraps a base matrix and optional base right-hand side.
    ///
    /// Without a base rhs a sparse synthetic one is generated once (every 10th
    /// entry set to a small positive random value) and reused as the base for
    /// all subsequent perturbations.
    pub fn new(
        base_matrix: CsrMatrix<f64>,
        base_rhs: Option<Vec<f64>>,
        noise: f64,
        rhs_randomness: f64,
        mut rng: StdRng,
    ) -> Result<Self, Pod2gError> {
        let n = base_matrix.nrows();
        if base_matrix.ncols() != n {
            return Err(Pod2gError::InvalidInput(format!(
                "base matrix is {}x{}, expected square",
                n,
                base_matrix.ncols()
            )));
        }
        let base_rhs = match base_rhs {
            Some(rhs) => {
                if rhs.len() != n {
                    return Err(Pod2gError::InvalidInput(format!(
                        "right-hand side has length {}, matrix order is {}",
                        rhs.len(),
                        n
                    )));
                }
                rhs
            }
            None => {
                let mut rhs = vec![0.0; n];
                for i in (0..n).step_by(10) {
                    rhs[i] = 1e-5 * rng.r#gen::<f64>();
                }
                rhs
            }
        };
        Ok(Self { base_matrix, base_rhs, noise, rhs_randomness, rng })
    }

    pub fn order(&self) -> usize {
        self.base_matrix.nrows()
    }
}

impl LinearSystemProvider for PerturbedSystemProvider {
    fn build(&mut self, parameters: &[f64]) -> Result<LinearSystem, Pod2gError> {
        if parameters.is_empty() {
            return Err(Pod2gError::InvalidInput(
                "parameter vector is empty; component 0 is the scaling factor".into(),
            ));
        }
        let factor = parameters[0];
        let noise = self.noise;
        let rng = &mut self.rng;
        let matrix = self
            .base_matrix
            .map_values(|v| v * (1.0 + factor * (1.0 + noise * (rng.r#gen::<f64>() - 0.5))));
        let rhs = self
            .base_rhs
            .iter()
            .map(|&r| r * (1.0 + self.rhs_randomness * (self.rng.r#gen::<f64>() - 0.5)))
            .collect();
        Ok(LinearSystem { matrix, rhs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn base() -> (CsrMatrix<f64>, Vec<f64>) {
        let m = CsrMatrix::from_triplets(
            3,
            3,
            vec![(0, 0, 4.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 4.0), (2, 2, 4.0)],
        )
        .unwrap();
        (m, vec![1.0, 2.0, 3.0])
    }

    #[test]
    fn zero_factor_zero_noise_is_identity() {
        let (m, rhs) = base();
        let mut provider =
            PerturbedSystemProvider::new(m.clone(), Some(rhs.clone()), 0.0, 0.0, StdRng::seed_from_u64(7))
                .unwrap();
        let sys = provider.build(&[0.0]).unwrap();
        assert_eq!(sys.matrix.values(), m.values());
        assert_eq!(sys.rhs, rhs);
        // repeated calls stay identical when nothing is perturbed
        let again = provider.build(&[0.0]).unwrap();
        assert_eq!(again.matrix.values(), m.values());
        assert_eq!(again.rhs, rhs);
    }

    #[test]
    fn noisy_builds_differ_without_reseeding() {
        let (m, rhs) = base();
        let mut provider =
            PerturbedSystemProvider::new(m, Some(rhs), 0.5, 0.0, StdRng::seed_from_u64(7)).unwrap();
        let a = provider.build(&[0.3]).unwrap();
        let b = provider.build(&[0.3]).unwrap();
        assert_ne!(a.matrix.values(), b.matrix.values());
    }

    #[test]
    fn empty_parameters_rejected() {
        let (m, rhs) = base();
        let mut provider =
            PerturbedSystemProvider::new(m, Some(rhs), 0.0, 0.0, StdRng::seed_from_u64(1)).unwrap();
        assert!(matches!(provider.build(&[]), Err(Pod2gError::InvalidInput(_))));
    }

    #[test]
    fn synthetic_rhs_every_tenth_entry() {
        let m = CsrMatrix::from_triplets(25, 25, (0..25).map(|i| (i, i, 1.0)).collect()).unwrap();
        let mut provider =
            PerturbedSystemProvider::new(m, None, 0.0, 0.0, StdRng::seed_from_u64(3)).unwrap();
        let sys = provider.build(&[0.0]).unwrap();
        for (i, &v) in sys.rhs.iter().enumerate() {
            if i % 10 == 0 {
                assert!(v > 0.0 && v < 1e-5);
            } else {
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn rhs_length_mismatch_rejected() {
        let (m, _) = base();
        let res = PerturbedSystemProvider::new(m, Some(vec![1.0]), 0.0, 0.0, StdRng::seed_from_u64(1));
        assert!(matches!(res, Err(Pod2gError::InvalidInput(_))));
    }
}
