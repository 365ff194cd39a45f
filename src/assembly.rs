//! Global stiffness and mass assembly from element providers

use log::debug;

use crate::analysis::MatrixStorage;
use crate::dof::DofIndex;
use crate::elements::{ElementMatrix, ElementProvider, Positions};
use crate::error::{FEAError, FEAResult};
use crate::math::{Mat, SparseMatrixBuilder, SystemMatrix};

enum Accumulator {
    Dense(Mat),
    Sparse(SparseMatrixBuilder),
}

impl Accumulator {
    fn new(storage: MatrixStorage, n: usize) -> Self {
        match storage {
            MatrixStorage::Dense => Accumulator::Dense(Mat::zeros(n, n)),
            MatrixStorage::Sparse => Accumulator::Sparse(SparseMatrixBuilder::new(n)),
        }
    }

    fn add(&mut self, row: usize, col: usize, value: f64) {
        match self {
            Accumulator::Dense(m) => m[(row, col)] += value,
            Accumulator::Sparse(b) => b.add(row, col, value),
        }
    }

    fn finish(self) -> FEAResult<SystemMatrix> {
        Ok(match self {
            Accumulator::Dense(m) => SystemMatrix::Dense(m),
            Accumulator::Sparse(b) => {
                debug!("compressing {} sparse entries", b.nnz());
                SystemMatrix::Sparse(b.to_csr()?)
            }
        })
    }
}

/// Scatter-adds element matrices into `N × N` global matrices
pub struct MatrixAssembler<'a> {
    index: &'a DofIndex,
    storage: MatrixStorage,
    positions: Positions,
    wtmass: f64,
}

impl<'a> MatrixAssembler<'a> {
    pub fn new(index: &'a DofIndex, storage: MatrixStorage) -> Self {
        let positions = index
            .grids()
            .iter()
            .map(|g| (g.id, g.position))
            .collect();
        Self {
            index,
            storage,
            positions,
            wtmass: 1.0,
        }
    }

    /// Scale applied to every mass term
    pub fn with_wtmass(mut self, wtmass: f64) -> Self {
        self.wtmass = wtmass;
        self
    }

    /// Grid positions handed to the providers
    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    /// Assemble `Kgg`
    pub fn assemble_stiffness(
        &self,
        elements: &[Box<dyn ElementProvider>],
    ) -> FEAResult<SystemMatrix> {
        let mut acc = Accumulator::new(self.storage, self.index.len());
        for element in elements {
            let ke = element.stiffness(self.index, &self.positions)?;
            self.scatter(&mut acc, element.as_ref(), &ke, 1.0)?;
        }
        debug!(
            "assembled {}x{} stiffness from {} elements",
            self.index.len(),
            self.index.len(),
            elements.len()
        );
        acc.finish()
    }

    /// Assemble `Mgg`, scaled by WTMASS
    pub fn assemble_mass(&self, elements: &[Box<dyn ElementProvider>]) -> FEAResult<SystemMatrix> {
        let mut acc = Accumulator::new(self.storage, self.index.len());
        let mut contributing = 0;
        for element in elements {
            if let Some(me) = element.mass(self.index, &self.positions)? {
                self.scatter(&mut acc, element.as_ref(), &me, self.wtmass)?;
                contributing += 1;
            }
        }
        debug!(
            "assembled mass from {} of {} elements (wtmass = {})",
            contributing,
            elements.len(),
            self.wtmass
        );
        acc.finish()
    }

    fn scatter(
        &self,
        acc: &mut Accumulator,
        element: &dyn ElementProvider,
        em: &ElementMatrix,
        scale: f64,
    ) -> FEAResult<()> {
        let n = self.index.len();
        let size = em.dofs.len();
        if em.matrix.nrows() != size || em.matrix.ncols() != size {
            return Err(FEAError::Configuration(format!(
                "{} {} returned a {}x{} matrix for {} DOFs",
                element.kind(),
                element.id(),
                em.matrix.nrows(),
                em.matrix.ncols(),
                size
            )));
        }
        if let Some(&bad) = em.dofs.iter().find(|&&d| d >= n) {
            return Err(FEAError::Configuration(format!(
                "{} {} references DOF index {} outside [0, {})",
                element.kind(),
                element.id(),
                bad,
                n
            )));
        }

        for (i, &gi) in em.dofs.iter().enumerate() {
            for (j, &gj) in em.dofs.iter().enumerate() {
                let value = if scale == 1.0 {
                    em.matrix[(i, j)]
                } else {
                    scale * em.matrix[(i, j)]
                };
                acc.add(gi, gj, value);
            }
        }
        Ok(())
    }
}
