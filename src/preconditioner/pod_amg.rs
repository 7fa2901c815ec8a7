//! POD-seeded two-grid preconditioner.
//!
//! The coarse space of a classical two-grid cycle is replaced by the reduced
//! basis extracted from the training-phase solution snapshots: prolongation is
//! the basis P itself, the coarse operator Aᶜ = Pᵀ A P is a small dense matrix
//! factorized once, and one Gauss–Seidel sweep smooths on the fine level. The
//! factory is initialized exactly once after training and every AI-enhanced
//! solve builds its preconditioner from the same basis.

use crate::error::Pod2gError;
use crate::matrix::CsrMatrix;
use crate::preconditioner::gauss_seidel::{GaussSeidel, SweepFlags};
use crate::preconditioner::Preconditioner;
use crate::reduction::pod_basis;
use faer::linalg::solvers::{FullPivLu, SolveCore};
use faer::{Mat, MatRef};

/// Builds [`PodAmg`] preconditioners from a one-time POD of solution snapshots.
pub struct PodAmgFactory {
    pub smoother_sweeps: usize,
    pub smoother_flags: SweepFlags,
    /// Drop trailing basis directions with numerically zero energy.
    pub keep_only_nonzero_components: bool,
    basis: Option<Mat<f64>>,
}

impl Default for PodAmgFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PodAmgFactory {
    /// One symmetric Gauss–Seidel sweep, zero-energy components dropped.
    pub fn new() -> Self {
        Self {
            smoother_sweeps: 1,
            smoother_flags: SweepFlags::SYMMETRIC_SWEEP,
            keep_only_nonzero_components: true,
            basis: None,
        }
    }

    /// One-time reduction step: extracts the reduced basis from `snapshots`
    /// (solutions as columns).
    pub fn initialize(
        &mut self,
        snapshots: MatRef<'_, f64>,
        num_components: usize,
    ) -> Result<(), Pod2gError> {
        let basis = pod_basis(snapshots, num_components, self.keep_only_nonzero_components)?;
        log::info!(
            "POD-AMG factory initialized: {} snapshots of length {} reduced to {} components",
            snapshots.ncols(),
            snapshots.nrows(),
            basis.ncols()
        );
        self.basis = Some(basis);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.basis.is_some()
    }

    /// Number of retained principal components, once initialized.
    pub fn num_components(&self) -> Option<usize> {
        self.basis.as_ref().map(|b| b.ncols())
    }

    /// Builds the two-grid preconditioner for one concrete system matrix.
    pub fn create(&self, a: &CsrMatrix<f64>) -> Result<PodAmg, Pod2gError> {
        let basis = self.basis.as_ref().ok_or(Pod2gError::PreconditionViolation(
            "POD-AMG factory used before the one-time training step",
        ))?;
        let n = a.nrows();
        let k = basis.ncols();
        if basis.nrows() != n {
            return Err(Pod2gError::InvalidInput(format!(
                "matrix order {} does not match basis length {}",
                n,
                basis.nrows()
            )));
        }

        // A P, one spmv per basis column
        let mut ap: Vec<Vec<f64>> = Vec::with_capacity(k);
        let mut col = vec![0.0; n];
        for j in 0..k {
            for i in 0..n {
                col[i] = basis[(i, j)];
            }
            let mut acol = vec![0.0; n];
            a.spmv(&col, &mut acol);
            ap.push(acol);
        }
        // coarse operator Ac = P^T (A P)
        let coarse = Mat::from_fn(k, k, |r, c| {
            (0..n).map(|i| basis[(i, r)] * ap[c][i]).sum::<f64>()
        });
        let coarse_lu = FullPivLu::new(coarse.as_ref());

        let mut smoother = GaussSeidel::new(self.smoother_flags, self.smoother_sweeps);
        smoother.setup(a)?;

        Ok(PodAmg { a: a.clone(), basis: basis.clone(), coarse_lu, smoother })
    }
}

/// Two-grid cycle: pre-smooth, coarse correction in the POD space, post-smooth.
pub struct PodAmg {
    a: CsrMatrix<f64>,
    basis: Mat<f64>,
    coarse_lu: FullPivLu<f64>,
    smoother: GaussSeidel,
}

impl PodAmg {
    fn coarse_correction(&self, r: &[f64], z: &mut [f64]) {
        let n = self.a.nrows();
        let k = self.basis.ncols();
        // fine residual r - A z
        let mut az = vec![0.0; n];
        self.a.spmv(z, &mut az);
        let fine: Vec<f64> = r.iter().zip(&az).map(|(ri, ai)| ri - ai).collect();
        // restrict, solve the dense coarse system in place, prolong
        let mut coarse: Vec<f64> = (0..k)
            .map(|j| (0..n).map(|i| self.basis[(i, j)] * fine[i]).sum())
            .collect();
        let rhs = faer::MatMut::from_column_major_slice_mut(&mut coarse, k, 1);
        self.coarse_lu.solve_in_place_with_conj(faer::Conj::No, rhs);
        for i in 0..n {
            let mut e = 0.0;
            for j in 0..k {
                e += self.basis[(i, j)] * coarse[j];
            }
            z[i] += e;
        }
    }
}

impl Preconditioner<CsrMatrix<f64>, Vec<f64>> for PodAmg {
    fn apply(&self, r: &Vec<f64>, z: &mut Vec<f64>) -> Result<(), Pod2gError> {
        z.iter_mut().for_each(|zi| *zi = 0.0);
        // forward half before, backward half after: keeps M symmetric for CG
        if self.smoother.flags.contains(SweepFlags::APPLY_LOWER) {
            for _ in 0..self.smoother.sweeps {
                self.smoother.sweep_forward(r, z)?;
            }
        }
        self.coarse_correction(r, z);
        if self.smoother.flags.contains(SweepFlags::APPLY_UPPER) {
            for _ in 0..self.smoother.sweeps {
                self.smoother.sweep_backward(r, z)?;
            }
        }
        Ok(())
    }
}
