//! Trait implementations for plain `Vec<T>` vectors.
//!
//! The iterative kernels are generic over an [`InnerProduct`] provider; the
//! unit type implements it for `Vec<T>` so solvers can be instantiated without
//! carrying a communicator object around. With the `rayon` feature enabled the
//! reductions run on the global thread pool.

use crate::core::traits::{Indexing, InnerProduct};
use num_traits::Float;

impl<T: Float + From<f64> + Send + Sync> InnerProduct<Vec<T>> for () {
    type Scalar = T;

    /// Computes the dot product of two vectors: `x^T y`.
    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.as_slice()
                .par_iter()
                .zip(y.as_slice().par_iter())
                .map(|(xi, yi)| *xi * *yi)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y.iter())
                .fold(T::zero(), |acc, (xi, yi)| acc + *xi * *yi)
        }
    }

    /// Computes the Euclidean norm `‖x‖₂`.
    fn norm(&self, x: &Vec<T>) -> T {
        self.dot(x, x).sqrt()
    }
}

impl<T> Indexing for Vec<T> {
    fn nrows(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::InnerProduct;

    #[test]
    fn dot_and_norm() {
        let ip = ();
        let x = vec![3.0_f64, 4.0];
        let y = vec![1.0_f64, 2.0];
        assert_eq!(ip.dot(&x, &y), 11.0);
        assert_eq!(ip.norm(&x), 5.0);
    }
}
