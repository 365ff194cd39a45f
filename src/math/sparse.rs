//! Sparse storage for assembled system matrices
//!
//! Element contributions are pushed into a COO-style triplet list and
//! compressed to CSR once assembly finishes.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

use crate::error::{FEAError, FEAResult};

/// Sparse matrix builder using COO format
/// More efficient for incremental assembly
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new sparse matrix builder
    pub fn new(size: usize) -> Self {
        // ~6 DOFs per grid with ~10 connected grids
        let estimated_nnz = size * 60;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    /// Add a value to the matrix (accumulates if already exists).
    ///
    /// Only exact zeros are dropped.
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Add a dense element matrix at the given global DOFs
    pub fn add_element_matrix(&mut self, dofs: &[usize], k_elem: &DMatrix<f64>) {
        for (i, &di) in dofs.iter().enumerate() {
            for (j, &dj) in dofs.iter().enumerate() {
                self.add(di, dj, k_elem[(i, j)]);
            }
        }
    }

    /// Compress to CSR, summing duplicates in push order
    pub fn to_csr(&self) -> FEAResult<CsrMatrix<f64>> {
        let mut sorted = self.entries.clone();
        // stable: duplicates keep their push order
        sorted.sort_by_key(|&(row, col, _)| (row, col));

        let mut row_offsets = vec![0usize; self.size + 1];
        let mut col_indices: Vec<usize> = Vec::with_capacity(sorted.len());
        let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut last = None;

        for (row, col, val) in sorted {
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += val;
                }
                continue;
            }
            col_indices.push(col);
            values.push(0.0 + val);
            row_offsets[row + 1] += 1;
            last = Some((row, col));
        }
        for i in 0..self.size {
            row_offsets[i + 1] += row_offsets[i];
        }

        CsrMatrix::try_from_csr_data(self.size, self.size, row_offsets, col_indices, values)
            .map_err(|e| FEAError::Configuration(format!("invalid sparse pattern: {}", e)))
    }

    /// Convert to dense matrix (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Number of pushed (uncompressed) entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Sparse matrix-vector multiplication
#[inline]
pub fn sparse_matvec(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let n = csr.nrows();
    let mut y = DVector::zeros(n);

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    for row in 0..n {
        let start = row_offsets[row];
        let end = row_offsets[row + 1];

        let mut sum = 0.0;
        for idx in start..end {
            sum += values[idx] * x[col_indices[idx]];
        }
        y[row] = sum;
    }

    y
}

/// Dense block `A[rows, cols]` of a CSR matrix
pub fn csr_submatrix(csr: &CsrMatrix<f64>, rows: &[usize], cols: &[usize]) -> DMatrix<f64> {
    let mut position = vec![None; csr.ncols()];
    for (j, &c) in cols.iter().enumerate() {
        position[c] = Some(j);
    }

    let mut sub = DMatrix::zeros(rows.len(), cols.len());
    for (i, &r) in rows.iter().enumerate() {
        let row = csr.row(r);
        for (&c, &v) in row.col_indices().iter().zip(row.values()) {
            if let Some(j) = position[c] {
                sub[(i, j)] = v;
            }
        }
    }
    sub
}
