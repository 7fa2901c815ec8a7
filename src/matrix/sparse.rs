//! Compressed sparse row storage for the system matrices.
//!
//! The perturbation step in [`crate::model`] clones the base matrix and
//! rescales every stored value, and the Gauss–Seidel smoother needs direct
//! row access, so the raw CSR arrays are kept on hand rather than hidden
//! behind an opaque handle.

use crate::core::traits::{Diagonal, Indexing, MatVec};
use crate::error::Pod2gError;
use num_traits::Float;

/// Square or rectangular CSR matrix with raw `row_ptr`/`col_idx`/`values` arrays.
#[derive(Clone, Debug)]
pub struct CsrMatrix<T> {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Float> CsrMatrix<T> {
    /// Build a CSR from raw row-ptr, col-idx, and values.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, Pod2gError> {
        if row_ptr.len() != nrows + 1 {
            return Err(Pod2gError::InvalidInput(format!(
                "row_ptr has length {}, expected {}",
                row_ptr.len(),
                nrows + 1
            )));
        }
        let nnz = *row_ptr.last().unwrap_or(&0);
        if col_idx.len() != nnz || values.len() != nnz {
            return Err(Pod2gError::InvalidInput(format!(
                "row_ptr announces {} nonzeros, got {} column indices and {} values",
                nnz,
                col_idx.len(),
                values.len()
            )));
        }
        if row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(Pod2gError::InvalidInput("row_ptr is not monotone".into()));
        }
        if col_idx.iter().any(|&j| j >= ncols) {
            return Err(Pod2gError::InvalidInput("column index out of range".into()));
        }
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    /// Assemble from (row, col, value) triplets, summing duplicates.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Result<Self, Pod2gError> {
        if triplets.iter().any(|&(r, c, _)| r >= nrows || c >= ncols) {
            return Err(Pod2gError::InvalidInput("triplet index out of range".into()));
        }
        triplets.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        let mut merged: Vec<(usize, usize, T)> = Vec::with_capacity(triplets.len());
        for (r, c, v) in triplets {
            match merged.last_mut() {
                Some(last) if last.0 == r && last.1 == c => last.2 = last.2 + v,
                _ => merged.push((r, c, v)),
            }
        }
        let mut row_ptr = vec![0usize; nrows + 1];
        for &(r, _, _) in &merged {
            row_ptr[r + 1] += 1;
        }
        for i in 0..nrows {
            row_ptr[i + 1] += row_ptr[i];
        }
        let col_idx = merged.iter().map(|t| t.1).collect();
        let values = merged.into_iter().map(|t| t.2).collect();
        Self::from_csr(nrows, ncols, row_ptr, col_idx, values)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Entries `(col, value)` of row `i`.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Clone with every stored value passed through `f`. The sparsity pattern
    /// is shared verbatim; this is the copy-on-perturb primitive.
    pub fn map_values(&self, mut f: impl FnMut(T) -> T) -> Self {
        Self {
            nrows: self.nrows,
            ncols: self.ncols,
            row_ptr: self.row_ptr.clone(),
            col_idx: self.col_idx.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// y = A x.
    pub fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        for i in 0..self.nrows {
            let mut sum = T::zero();
            for (j, v) in self.row(i) {
                sum = sum + v * x[j];
            }
            y[i] = sum;
        }
    }
}

#[cfg(feature = "rayon")]
impl<T: Float + Send + Sync> CsrMatrix<T> {
    /// Parallel SpMV using Rayon.
    pub fn spmv_parallel(&self, x: &[T], y: &mut [T]) {
        use rayon::prelude::*;
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        y.par_iter_mut().enumerate().for_each(|(i, yi)| {
            let mut sum = T::zero();
            for (j, v) in self.row(i) {
                sum = sum + v * x[j];
            }
            *yi = sum;
        });
    }
}

impl<T: Float> MatVec<Vec<T>> for CsrMatrix<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        self.spmv(x, y);
    }
}

impl<T> Indexing for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
}

impl<T: Float> Diagonal<T> for CsrMatrix<T> {
    fn diagonal(&self) -> Vec<T> {
        let mut d = vec![T::zero(); self.nrows];
        for i in 0..self.nrows.min(self.ncols) {
            for (j, v) in self.row(i) {
                if j == i {
                    d[i] = v;
                }
            }
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_spmv() {
        // 3×3 identity in CSR: row_ptr=[0,1,2,3], col_idx=[0,1,2], vals=[1,1,1]
        let m = CsrMatrix::from_csr(3, 3, vec![0, 1, 2, 3], vec![0, 1, 2], vec![1.0, 1.0, 1.0])
            .unwrap();
        let x = vec![2.0, 3.0, 5.0];
        let mut y = vec![0.0; 3];
        m.spmv(&x, &mut y);
        assert_eq!(y, x);
    }

    #[test]
    fn simple_pattern() {
        // 2×3 matrix [[1,2,0],[0,3,4]]
        let m = CsrMatrix::from_csr(2, 3, vec![0, 2, 4], vec![0, 1, 1, 2], vec![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        let x = vec![1.0, 1.0, 1.0];
        let mut y = vec![0.0; 2];
        m.spmv(&x, &mut y);
        assert_eq!(y, vec![3.0, 7.0]);
    }

    #[test]
    fn triplets_assemble_sorted_with_duplicates() {
        let m = CsrMatrix::from_triplets(
            2,
            2,
            vec![(1, 0, 5.0), (0, 0, 1.0), (0, 1, 2.0), (0, 0, 3.0)],
        )
        .unwrap();
        assert_eq!(m.nnz(), 3);
        let mut y = vec![0.0; 2];
        m.spmv(&[1.0, 1.0], &mut y);
        assert_eq!(y, vec![6.0, 5.0]);
    }

    #[test]
    fn diagonal_and_map_values() {
        let m = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 2.0), (0, 1, -1.0), (1, 1, 4.0)])
            .unwrap();
        assert_eq!(m.diagonal(), vec![2.0, 4.0]);
        let doubled = m.map_values(|v| 2.0 * v);
        assert_eq!(doubled.diagonal(), vec![4.0, 8.0]);
        // base untouched
        assert_eq!(m.values(), &[2.0, -1.0, 4.0]);
    }

    #[test]
    fn bad_shapes_rejected() {
        assert!(CsrMatrix::from_csr(2, 2, vec![0, 1], vec![0], vec![1.0]).is_err());
        assert!(CsrMatrix::from_csr(1, 1, vec![0, 2], vec![0], vec![1.0]).is_err());
        assert!(CsrMatrix::from_csr(1, 1, vec![0, 1], vec![3], vec![1.0]).is_err());
    }
}
