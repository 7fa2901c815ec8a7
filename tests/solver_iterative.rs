//! Solver-level tests: PCG against a direct solve, cap exhaustion, and the
//! percentage iteration cap from the response pipeline's solve policy.

use approx::assert_abs_diff_eq;
use faer::Mat;
use faer::linalg::solvers::SolveCore;
use pod2g::core::Diagonal;
use pod2g::matrix::CsrMatrix;
use pod2g::preconditioner::Jacobi;
use pod2g::solver::{LinearSolver, PcgSolver};
use pod2g::utils::convergence::percentage_max_iterations;

fn tridiagonal(n: usize, diag: f64, off: f64) -> CsrMatrix<f64> {
    let mut t = Vec::new();
    for i in 0..n {
        t.push((i, i, diag));
        if i > 0 {
            t.push((i, i - 1, off));
        }
        if i + 1 < n {
            t.push((i, i + 1, off));
        }
    }
    CsrMatrix::from_triplets(n, n, t).unwrap()
}

fn residual_norm(a: &CsrMatrix<f64>, b: &[f64], x: &[f64]) -> f64 {
    let mut ax = vec![0.0; b.len()];
    a.spmv(x, &mut ax);
    b.iter().zip(&ax).map(|(bi, ai)| (bi - ai) * (bi - ai)).sum::<f64>().sqrt()
}

#[test]
fn training_style_solve_converges_within_the_percentage_cap() {
    // 5x5 diagonally dominant SPD system; Jacobi makes the preconditioned
    // operator the identity, so one iteration lands inside the 20% cap.
    let a = CsrMatrix::from_triplets(5, 5, (0..5).map(|i| (i, i, (i + 3) as f64)).collect())
        .unwrap();
    let b = vec![1.0, -2.0, 3.0, 0.5, 4.0];
    let cap = percentage_max_iterations(5, 0.2);
    assert_eq!(cap, 1);

    let pc = Jacobi::from_diagonal(&a.diagonal()).unwrap();
    let mut x = vec![0.0; 5];
    let mut solver = PcgSolver::new(1e-6, cap).with_reorthogonalization(true);
    let stats = solver.solve(&a, Some(&pc), &b, &mut x).unwrap();
    assert!(stats.converged);
    assert!(stats.iterations <= cap);

    let b_norm: f64 = b.iter().map(|v| v * v).sum::<f64>().sqrt();
    assert!(residual_norm(&a, &b, &x) < 1e-6 * b_norm);
}

#[test]
fn pcg_matches_direct_lu_on_a_tridiagonal_system() {
    let n = 10;
    let a = tridiagonal(n, 4.0, -1.0);
    let b: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();

    let mut x_cg = vec![0.0; n];
    let mut solver = PcgSolver::new(1e-10, 200);
    let stats = solver.solve(&a, None, &b, &mut x_cg).unwrap();
    assert!(stats.converged);

    // direct solve on the dense counterpart
    let dense = Mat::from_fn(n, n, |i, j| {
        a.row(i).find(|&(c, _)| c == j).map(|(_, v)| v).unwrap_or(0.0)
    });
    let lu = faer::linalg::solvers::FullPivLu::new(dense.as_ref());
    let mut x_direct = b.clone();
    let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x_direct, n, 1);
    lu.solve_in_place_with_conj(faer::Conj::No, x_mat);

    for i in 0..n {
        assert_abs_diff_eq!(x_cg[i], x_direct[i], epsilon = 1e-8);
    }
}

#[test]
fn exhausted_cap_reports_unconverged_without_panicking() {
    let n = 50;
    let a = tridiagonal(n, 2.0, -1.0);
    let b = vec![1.0; n];
    let mut x = vec![0.0; n];
    let mut solver = PcgSolver::new(1e-12, 3);
    let stats = solver.solve(&a, None, &b, &mut x).unwrap();
    assert!(!stats.converged);
    assert_eq!(stats.iterations, 3);
    // the partial iterate is still an improvement over the zero guess
    let b_norm: f64 = b.iter().map(|v| v * v).sum::<f64>().sqrt();
    assert!(residual_norm(&a, &b, &x) < b_norm);
}

#[test]
fn reorthogonalization_does_not_change_a_well_conditioned_answer() {
    let n = 12;
    let a = tridiagonal(n, 5.0, -1.0);
    let b: Vec<f64> = (0..n).map(|i| 1.0 + (i % 3) as f64).collect();

    let mut x_plain = vec![0.0; n];
    let mut x_reortho = vec![0.0; n];
    PcgSolver::new(1e-12, 100).solve(&a, None, &b, &mut x_plain).unwrap();
    PcgSolver::new(1e-12, 100)
        .with_reorthogonalization(true)
        .solve(&a, None, &b, &mut x_reortho)
        .unwrap();

    for (p, r) in x_plain.iter().zip(&x_reortho) {
        assert_abs_diff_eq!(p, r, epsilon = 1e-8);
    }
}
