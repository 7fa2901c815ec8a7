//! Gauss–Seidel relaxation sweeps over CSR rows.
//!
//! Serves two roles: a standalone [`Preconditioner`] and the smoother inside
//! [`crate::preconditioner::PodAmg`], which drives the forward/backward halves
//! of a symmetric sweep separately around its coarse correction.

use crate::error::Pod2gError;
use crate::matrix::CsrMatrix;
use crate::preconditioner::Preconditioner;
use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct SweepFlags: u32 {
        const APPLY_LOWER     = 0b01; // forward Gauss–Seidel
        const APPLY_UPPER     = 0b10; // backward
        const SYMMETRIC_SWEEP = Self::APPLY_LOWER.bits() | Self::APPLY_UPPER.bits();
    }
}

/// Gauss–Seidel smoother bound to a matrix via [`Preconditioner::setup`].
pub struct GaussSeidel {
    pub sweeps: usize,
    pub flags: SweepFlags,
    a: Option<CsrMatrix<f64>>,
    inv_diag: Vec<f64>,
}

impl GaussSeidel {
    pub fn new(flags: SweepFlags, sweeps: usize) -> Self {
        Self { sweeps, flags, a: None, inv_diag: Vec::new() }
    }

    fn bound(&self) -> Result<&CsrMatrix<f64>, Pod2gError> {
        self.a
            .as_ref()
            .ok_or(Pod2gError::PreconditionViolation("Gauss-Seidel smoother used before setup"))
    }

    fn relax_row(a: &CsrMatrix<f64>, inv_diag: &[f64], b: &[f64], x: &mut [f64], i: usize) {
        let mut sum = b[i];
        for (j, v) in a.row(i) {
            if j != i {
                sum -= v * x[j];
            }
        }
        x[i] = sum * inv_diag[i];
    }

    /// One forward sweep of x ← (D + L)⁻¹ (b − U x).
    pub fn sweep_forward(&self, b: &[f64], x: &mut [f64]) -> Result<(), Pod2gError> {
        let a = self.bound()?;
        for i in 0..a.nrows() {
            Self::relax_row(a, &self.inv_diag, b, x, i);
        }
        Ok(())
    }

    /// One backward sweep of x ← (D + U)⁻¹ (b − L x).
    pub fn sweep_backward(&self, b: &[f64], x: &mut [f64]) -> Result<(), Pod2gError> {
        let a = self.bound()?;
        for i in (0..a.nrows()).rev() {
            Self::relax_row(a, &self.inv_diag, b, x, i);
        }
        Ok(())
    }

    /// Runs the configured sweeps, forward then backward per `flags`.
    pub fn smooth(&self, b: &[f64], x: &mut [f64]) -> Result<(), Pod2gError> {
        for _ in 0..self.sweeps {
            if self.flags.contains(SweepFlags::APPLY_LOWER) {
                self.sweep_forward(b, x)?;
            }
            if self.flags.contains(SweepFlags::APPLY_UPPER) {
                self.sweep_backward(b, x)?;
            }
        }
        Ok(())
    }
}

impl Preconditioner<CsrMatrix<f64>, Vec<f64>> for GaussSeidel {
    fn setup(&mut self, a: &CsrMatrix<f64>) -> Result<(), Pod2gError> {
        let diag = crate::core::traits::Diagonal::diagonal(a);
        let mut inv_diag = Vec::with_capacity(diag.len());
        for (i, d) in diag.into_iter().enumerate() {
            if d == 0.0 {
                return Err(Pod2gError::ZeroPivot(i));
            }
            inv_diag.push(1.0 / d);
        }
        self.inv_diag = inv_diag;
        self.a = Some(a.clone());
        Ok(())
    }

    fn apply(&self, r: &Vec<f64>, z: &mut Vec<f64>) -> Result<(), Pod2gError> {
        z.iter_mut().for_each(|zi| *zi = 0.0);
        self.smooth(r, z)
    }
}
