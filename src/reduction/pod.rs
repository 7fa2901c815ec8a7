//! Proper orthogonal decomposition of a snapshot matrix.
//!
//! Snapshots are solution vectors stored as columns of a dense matrix with
//! far fewer columns than rows, so the decomposition works in sample space:
//! eigenpairs of the small Gram matrix Sᵀ S are found by power iteration with
//! deflation and lifted back to full-length directions V = S u / √λ.

use crate::error::Pod2gError;
use faer::{Mat, MatRef};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Relative energy below which a principal component counts as numerically zero.
const ZERO_ENERGY_TOL: f64 = 1e-12;

const POWER_ITERATIONS: usize = 200;

/// Extracts an orthonormal basis of the `num_components` dominant directions
/// of the snapshot column space.
///
/// With `keep_only_nonzero` set, trailing components whose energy is
/// negligible relative to the dominant one are dropped, so the returned basis
/// may have fewer columns than requested.
pub fn pod_basis(
    snapshots: MatRef<'_, f64>,
    num_components: usize,
    keep_only_nonzero: bool,
) -> Result<Mat<f64>, Pod2gError> {
    let n = snapshots.nrows();
    let m = snapshots.ncols();
    if n == 0 || m == 0 {
        return Err(Pod2gError::InconsistentTrainingData(
            "POD requires at least one snapshot".into(),
        ));
    }
    if num_components == 0 {
        return Err(Pod2gError::InconsistentTrainingData(
            "POD requires at least one principal component".into(),
        ));
    }
    let k = num_components.min(m);

    // Gram matrix in sample space, m x m.
    let gram: Vec<Vec<f64>> = (0..m)
        .map(|i| {
            (0..m)
                .map(|j| (0..n).map(|r| snapshots[(r, i)] * snapshots[(r, j)]).sum::<f64>())
                .collect()
        })
        .collect();

    let (eigenvalues, eigenvectors) = symmetric_eigen_topk(&gram, k);

    let lambda_max = eigenvalues.first().copied().unwrap_or(0.0);
    if lambda_max <= 0.0 {
        return Err(Pod2gError::InconsistentTrainingData(
            "snapshot matrix has no energy (all solutions are zero)".into(),
        ));
    }

    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(k);
    for (j, &lambda) in eigenvalues.iter().enumerate() {
        if keep_only_nonzero && lambda <= ZERO_ENERGY_TOL * lambda_max {
            break;
        }
        // lift u_j to full space: v_j = S u_j / sqrt(lambda_j)
        let scale = lambda.max(ZERO_ENERGY_TOL * lambda_max).sqrt();
        let mut v: Vec<f64> = (0..n)
            .map(|r| (0..m).map(|c| snapshots[(r, c)] * eigenvectors[j][c]).sum::<f64>() / scale)
            .collect();
        // modified Gram-Schmidt against the columns already accepted
        for prev in &columns {
            let proj: f64 = v.iter().zip(prev).map(|(a, b)| a * b).sum();
            v.iter_mut().zip(prev).for_each(|(a, b)| *a -= proj * b);
        }
        let norm = v.iter().map(|a| a * a).sum::<f64>().sqrt();
        if norm <= ZERO_ENERGY_TOL {
            continue;
        }
        v.iter_mut().for_each(|a| *a /= norm);
        columns.push(v);
    }

    if columns.is_empty() {
        return Err(Pod2gError::InconsistentTrainingData(
            "POD produced no usable principal components".into(),
        ));
    }
    Ok(Mat::from_fn(n, columns.len(), |i, j| columns[j][i]))
}

/// Top-k eigenpairs of a symmetric PSD matrix by power iteration with deflation.
fn symmetric_eigen_topk(a: &[Vec<f64>], k: usize) -> (Vec<f64>, Vec<Vec<f64>>) {
    let m = a.len();
    let k = k.min(m);
    let mut eigenvalues = Vec::with_capacity(k);
    let mut eigenvectors: Vec<Vec<f64>> = Vec::with_capacity(k);
    let mut deflated = a.to_vec();
    // fixed seed: the basis must not depend on ambient state
    let mut rng = StdRng::seed_from_u64(0x9E37_79B9_7F4A_7C15);

    for _ in 0..k {
        let mut v: Vec<f64> = (0..m).map(|_| rng.r#gen::<f64>() - 0.5).collect();
        normalize(&mut v);
        for _ in 0..POWER_ITERATIONS {
            let av = mat_vec(&deflated, &v);
            let norm = av.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm < 1e-300 {
                break;
            }
            v = av.iter().map(|x| x / norm).collect();
        }
        let av = mat_vec(&deflated, &v);
        let lambda = v.iter().zip(&av).map(|(a, b)| a * b).sum::<f64>().max(0.0);
        eigenvalues.push(lambda);
        // deflate: A ← A − λ v vᵀ
        for r in 0..m {
            for c in 0..m {
                deflated[r][c] -= lambda * v[r] * v[c];
            }
        }
        eigenvectors.push(v);
    }
    (eigenvalues, eigenvectors)
}

fn mat_vec(a: &[Vec<f64>], x: &[f64]) -> Vec<f64> {
    a.iter()
        .map(|row| row.iter().zip(x).map(|(aij, xj)| aij * xj).sum())
        .collect()
}

fn normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn basis_is_orthonormal() {
        // snapshots spanning a 2-dimensional subspace of R^4, plus noise-free copies
        let s = Mat::from_fn(4, 5, |i, j| {
            let a = [1.0, 0.0, 1.0, 0.0][i];
            let b = [0.0, 1.0, 0.0, -1.0][i];
            (j as f64 + 1.0) * a + (2.0 - j as f64) * b
        });
        let basis = pod_basis(s.as_ref(), 3, true).unwrap();
        assert!(basis.ncols() <= 3);
        assert!(basis.ncols() >= 2);
        for c1 in 0..basis.ncols() {
            for c2 in 0..basis.ncols() {
                let dot: f64 = (0..4).map(|i| basis[(i, c1)] * basis[(i, c2)]).sum();
                let expected = if c1 == c2 { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(dot, expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn rank_one_snapshots_yield_single_component() {
        let s = Mat::from_fn(6, 4, |i, j| (i as f64 + 1.0) * (j as f64 + 1.0));
        let basis = pod_basis(s.as_ref(), 3, true).unwrap();
        assert_eq!(basis.ncols(), 1);
    }

    #[test]
    fn zero_snapshots_rejected() {
        let s = Mat::<f64>::zeros(4, 3);
        assert!(matches!(
            pod_basis(s.as_ref(), 2, true),
            Err(Pod2gError::InconsistentTrainingData(_))
        ));
    }

    #[test]
    fn zero_components_rejected() {
        let s = Mat::from_fn(3, 2, |i, j| (i + j) as f64);
        assert!(matches!(
            pod_basis(s.as_ref(), 0, true),
            Err(Pod2gError::InconsistentTrainingData(_))
        ));
    }
}
