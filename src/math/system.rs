//! Assembled global matrices in either storage

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

use super::sparse::{csr_submatrix, sparse_matvec};
use super::submatrix;

/// A square global matrix (`Kgg`, `Mgg`), dense or CSR
#[derive(Debug, Clone, PartialEq)]
pub enum SystemMatrix {
    Dense(DMatrix<f64>),
    Sparse(CsrMatrix<f64>),
}

impl SystemMatrix {
    pub fn size(&self) -> usize {
        match self {
            SystemMatrix::Dense(m) => m.nrows(),
            SystemMatrix::Sparse(m) => m.nrows(),
        }
    }

    /// Entry `(i, j)`; zero outside the sparse pattern
    pub fn get(&self, i: usize, j: usize) -> f64 {
        match self {
            SystemMatrix::Dense(m) => m[(i, j)],
            SystemMatrix::Sparse(m) => m
                .get_entry(i, j)
                .map(|e| e.into_value())
                .unwrap_or(0.0),
        }
    }

    pub fn diagonal(&self) -> DVector<f64> {
        DVector::from_iterator(self.size(), (0..self.size()).map(|i| self.get(i, i)))
    }

    /// Dense block `A[rows, cols]`
    pub fn block(&self, rows: &[usize], cols: &[usize]) -> DMatrix<f64> {
        match self {
            SystemMatrix::Dense(m) => submatrix(m, rows, cols),
            SystemMatrix::Sparse(m) => csr_submatrix(m, rows, cols),
        }
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let all: Vec<usize> = (0..self.size()).collect();
        match self {
            SystemMatrix::Dense(m) => m.clone(),
            SystemMatrix::Sparse(m) => csr_submatrix(m, &all, &all),
        }
    }

    pub fn mul_vector(&self, x: &DVector<f64>) -> DVector<f64> {
        match self {
            SystemMatrix::Dense(m) => m * x,
            SystemMatrix::Sparse(m) => sparse_matvec(m, x),
        }
    }

    /// Largest absolute asymmetry `|A(i,j) - A(j,i)|`
    pub fn asymmetry(&self) -> f64 {
        let dense = self.to_dense();
        (&dense - dense.transpose()).amax()
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, SystemMatrix::Sparse(_))
    }
}

impl From<DMatrix<f64>> for SystemMatrix {
    fn from(m: DMatrix<f64>) -> Self {
        SystemMatrix::Dense(m)
    }
}
