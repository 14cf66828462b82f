//! Small dense systems arising in interaction-region assembly.
//!
//! Flux continuity across the half edges of an interaction region leads to
//! systems of the form `T = C A^{-1} B + F` (interior) or `A T = B` with an
//! inhomogeneity from boundary data. The matrices are at most 4x4; they are
//! factored with a full-pivot LU and solved column by column.

use faer::{linalg::solvers::Solve, Mat};

/// Solve `A X = B` and `A r = r1` with a single LU factorization.
pub(crate) fn solve_pair<const N: usize, const M: usize>(
    a: [[f64; N]; N],
    b: [[f64; M]; N],
    r1: [f64; N],
) -> ([[f64; M]; N], [f64; N]) {
    let mut am = Mat::zeros(N, N);
    for i in 0..N {
        for j in 0..N {
            am[(i, j)] = a[i][j];
        }
    }
    let lu = am.as_ref().full_piv_lu();

    let mut x = [[0.0; M]; N];
    let mut rhs = Mat::zeros(N, 1);
    for col in 0..M {
        for row in 0..N {
            rhs[(row, 0)] = b[row][col];
        }
        let sol = lu.solve(&rhs);
        for row in 0..N {
            x[row][col] = sol[(row, 0)];
        }
    }

    for row in 0..N {
        rhs[(row, 0)] = r1[row];
    }
    let sol = lu.solve(&rhs);
    let mut r = [0.0; N];
    for row in 0..N {
        r[row] = sol[(row, 0)];
    }

    (x, r)
}

/// Solve `A X = B` column by column.
pub(crate) fn solve_matrix<const N: usize, const M: usize>(
    a: [[f64; N]; N],
    b: [[f64; M]; N],
) -> [[f64; M]; N] {
    solve_pair(a, b, [0.0; N]).0
}

pub(crate) fn mat_mul<const R: usize, const K: usize, const C: usize>(
    a: &[[f64; K]; R],
    b: &[[f64; C]; K],
) -> [[f64; C]; R] {
    let mut out = [[0.0; C]; R];
    for i in 0..R {
        for j in 0..C {
            let mut sum = 0.0;
            for k in 0..K {
                sum += a[i][k] * b[k][j];
            }
            out[i][j] = sum;
        }
    }
    out
}

pub(crate) fn mat_vec<const R: usize, const C: usize>(
    a: &[[f64; C]; R],
    x: &[f64; C],
) -> [f64; R] {
    let mut out = [0.0; R];
    for i in 0..R {
        let mut sum = 0.0;
        for j in 0..C {
            sum += a[i][j] * x[j];
        }
        out[i] = sum;
    }
    out
}

pub(crate) fn mat_add<const R: usize, const C: usize>(
    a: &[[f64; C]; R],
    b: &[[f64; C]; R],
) -> [[f64; C]; R] {
    let mut out = [[0.0; C]; R];
    for i in 0..R {
        for j in 0..C {
            out[i][j] = a[i][j] + b[i][j];
        }
    }
    out
}
