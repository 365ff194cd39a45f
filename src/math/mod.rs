//! Mathematical utilities: partitioning, dense solves and symmetric eigenproblems

pub mod sparse;
mod system;

use nalgebra::{Cholesky, DMatrix, DVector, Matrix3, SymmetricEigen, Vector3};

pub use sparse::SparseMatrixBuilder;
pub use system::SystemMatrix;

use crate::error::{FEAError, FEAResult};

pub type Mat = DMatrix<f64>;
pub type Vector = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// Cross-product matrix: `skew(a) * b == a × b`
pub fn skew(v: &Vec3) -> Mat3 {
    Mat3::new(0.0, -v[2], v[1], v[2], 0.0, -v[0], -v[1], v[0], 0.0)
}

/// Indices of `[0, n)` not in `taken`, ascending
pub fn complement(n: usize, taken: &[usize]) -> Vec<usize> {
    let mut mask = vec![false; n];
    for &i in taken {
        if i < n {
            mask[i] = true;
        }
    }
    (0..n).filter(|&i| !mask[i]).collect()
}

/// Dense block `A[rows, cols]`
pub fn submatrix(a: &Mat, rows: &[usize], cols: &[usize]) -> Mat {
    Mat::from_fn(rows.len(), cols.len(), |i, j| a[(rows[i], cols[j])])
}

/// `v[indices]`
pub fn subvector(v: &Vector, indices: &[usize]) -> Vector {
    Vector::from_iterator(indices.len(), indices.iter().map(|&i| v[i]))
}

/// Reassemble a length-`n` vector from disjoint parts.
///
/// Every index in `[0, n)` must be written exactly once.
pub fn scatter(n: usize, parts: &[(&[usize], &Vector)]) -> FEAResult<Vector> {
    let mut out = Vector::zeros(n);
    let mut written = vec![false; n];

    for (indices, values) in parts {
        if indices.len() != values.len() {
            return Err(FEAError::Configuration(format!(
                "partition has {} indices but {} values",
                indices.len(),
                values.len()
            )));
        }
        for (k, &i) in indices.iter().enumerate() {
            if i >= n || written[i] {
                return Err(FEAError::Configuration(format!(
                    "DOF index {} written twice or out of range during reconstruction",
                    i
                )));
            }
            written[i] = true;
            out[i] = values[k];
        }
    }

    if let Some(missing) = written.iter().position(|w| !w) {
        return Err(FEAError::Configuration(format!(
            "DOF index {} missing from reconstruction",
            missing
        )));
    }
    Ok(out)
}

/// Solve a linear system using LU decomposition
pub fn solve_linear_system(a: &Mat, b: &Vector) -> Option<Vector> {
    a.clone().lu().solve(b)
}

/// Flip each column so its largest-magnitude component is positive
pub fn normalize_signs(vectors: &mut Mat) {
    for mut col in vectors.column_iter_mut() {
        let pivot = col.iter().copied().fold(0.0_f64, |best, v| {
            if v.abs() > best.abs() {
                v
            } else {
                best
            }
        });
        if pivot < 0.0 {
            col.neg_mut();
        }
    }
}

/// Symmetric eigen decomposition with eigenvalues ascending and
/// sign-normalised eigenvector columns
pub fn symmetric_eigen_sorted(a: Mat) -> (Vector, Mat) {
    if a.nrows() == 0 {
        return (Vector::zeros(0), Mat::zeros(0, 0));
    }
    let eigen = SymmetricEigen::new(a);
    let n = eigen.eigenvalues.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eigen.eigenvalues[i].total_cmp(&eigen.eigenvalues[j]));

    let values = Vector::from_iterator(n, order.iter().map(|&i| eigen.eigenvalues[i]));
    let mut vectors = Mat::from_fn(eigen.eigenvectors.nrows(), n, |r, c| {
        eigen.eigenvectors[(r, order[c])]
    });
    normalize_signs(&mut vectors);
    (values, vectors)
}

/// Solve `K x = λ M x` for symmetric `K` and symmetric positive definite `M`.
///
/// Eigenvalues come back ascending and eigenvectors are mass-normalised
/// (`xᵀ M x = 1`). Returns `None` when `M` is not positive definite.
pub fn generalized_symmetric_eigen(k: &Mat, m: &Mat) -> Option<(Vector, Mat)> {
    if k.nrows() == 0 {
        return Some((Vector::zeros(0), Mat::zeros(0, 0)));
    }
    let l = Cholesky::new(m.clone())?.l();

    // A = L⁻¹ K L⁻ᵀ
    let x = l.solve_lower_triangular(k)?;
    let a = l.solve_lower_triangular(&x.transpose())?;
    let a = (&a + a.transpose()) * 0.5;

    let (values, y) = symmetric_eigen_sorted(a);
    let mut vectors = l.transpose().solve_upper_triangular(&y)?;
    normalize_signs(&mut vectors);
    Some((values, vectors))
}
