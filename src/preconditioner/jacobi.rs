// Jacobi preconditioner implementation

use crate::core::traits::Diagonal;
use crate::error::Pod2gError;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Jacobi preconditioner: M⁻¹ = D⁻¹
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Float> Jacobi<T> {
    /// new with empty state; user must call `setup`.
    pub fn new() -> Self {
        Self { inv_diag: Vec::new() }
    }

    /// Build directly from an already extracted diagonal.
    pub fn from_diagonal(diag: &[T]) -> Result<Self, Pod2gError> {
        let mut inv_diag = Vec::with_capacity(diag.len());
        for (i, &d) in diag.iter().enumerate() {
            if d == T::zero() {
                return Err(Pod2gError::ZeroPivot(i));
            }
            inv_diag.push(T::one() / d);
        }
        Ok(Self { inv_diag })
    }
}

impl<T: Float> Default for Jacobi<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, V, T> Preconditioner<M, V> for Jacobi<T>
where
    M: Diagonal<T>,
    V: AsRef<[T]> + AsMut<[T]>,
    T: Float,
{
    fn setup(&mut self, a: &M) -> Result<(), Pod2gError> {
        *self = Self::from_diagonal(&a.diagonal())?;
        Ok(())
    }

    fn apply(&self, x: &V, y: &mut V) -> Result<(), Pod2gError> {
        let x_ref = x.as_ref();
        let y_mut = y.as_mut();
        for i in 0..x_ref.len() {
            y_mut[i] = self.inv_diag[i] * x_ref[i];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;

    #[test]
    fn applies_inverse_diagonal() {
        let a = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 2.0), (0, 1, 7.0), (1, 1, 4.0)]).unwrap();
        let mut pc = Jacobi::new();
        Preconditioner::<CsrMatrix<f64>, Vec<f64>>::setup(&mut pc, &a).unwrap();
        let r = vec![2.0, 2.0];
        let mut z = vec![0.0; 2];
        Preconditioner::<CsrMatrix<f64>, Vec<f64>>::apply(&pc, &r, &mut z).unwrap();
        assert_eq!(z, vec![1.0, 0.5]);
    }

    #[test]
    fn zero_diagonal_is_a_zero_pivot() {
        let a = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 2.0), (1, 0, 1.0)]).unwrap();
        let mut pc = Jacobi::<f64>::new();
        let res = Preconditioner::<CsrMatrix<f64>, Vec<f64>>::setup(&mut pc, &a);
        assert!(matches!(res, Err(Pod2gError::ZeroPivot(1))));
    }
}
