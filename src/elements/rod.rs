//! Rod element - axial and torsional stiffness between two grid points

use nalgebra::{DMatrix, Matrix3};
use serde::{Deserialize, Serialize};

use super::{grid_dofs, position_of, ElementMatrix, ElementProvider, Material, Positions, Section};
use crate::dof::DofIndex;
use crate::error::{FEAError, FEAResult};

/// A two-node rod (CROD-like): axial EA/L and torsional GJ/L along its axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rod {
    pub id: u32,
    /// End A grid
    pub ga: u32,
    /// End B grid
    pub gb: u32,
    pub material: Material,
    pub section: Section,
}

impl Rod {
    pub fn new(id: u32, ga: u32, gb: u32, material: Material, section: Section) -> Self {
        Self {
            id,
            ga,
            gb,
            material,
            section,
        }
    }

    /// Length and unit axis from A to B
    fn geometry(&self, positions: &Positions) -> FEAResult<(f64, nalgebra::Vector3<f64>)> {
        let xa = position_of(positions, self.ga)?;
        let xb = position_of(positions, self.gb)?;
        let axis = xb - xa;
        let length = axis.norm();
        if length == 0.0 {
            return Err(FEAError::Configuration(format!(
                "rod {} has zero length between grids {} and {}",
                self.id, self.ga, self.gb
            )));
        }
        Ok((length, axis / length))
    }

    fn dofs(&self, index: &DofIndex) -> FEAResult<Vec<usize>> {
        let mut dofs = grid_dofs(index, self.ga)?.to_vec();
        dofs.extend_from_slice(&grid_dofs(index, self.gb)?);
        Ok(dofs)
    }

    /// Axial stiffness EA/L for a given length
    pub fn axial_stiffness(&self, length: f64) -> f64 {
        self.material.e * self.section.a / length
    }
}

/// Place `±k·nnᵀ` into the four blocks coupling ends A and B at `offset`
fn add_axis_blocks(k: &mut DMatrix<f64>, offset: usize, block: &Matrix3<f64>) {
    for (ra, ca, sign) in [(0, 0, 1.0), (0, 6, -1.0), (6, 0, -1.0), (6, 6, 1.0)] {
        for i in 0..3 {
            for j in 0..3 {
                k[(ra + offset + i, ca + offset + j)] += sign * block[(i, j)];
            }
        }
    }
}

impl ElementProvider for Rod {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> &'static str {
        "CROD"
    }

    fn stiffness(&self, index: &DofIndex, positions: &Positions) -> FEAResult<ElementMatrix> {
        let (length, n) = self.geometry(positions)?;
        let nnt = n * n.transpose();

        let mut k = DMatrix::zeros(12, 12);
        add_axis_blocks(&mut k, 0, &(nnt * self.axial_stiffness(length)));
        if self.section.j != 0.0 {
            let kt = self.material.g * self.section.j / length;
            add_axis_blocks(&mut k, 3, &(nnt * kt));
        }

        Ok(ElementMatrix::new(self.dofs(index)?, k))
    }

    /// Lumped: half the rod mass on each end's translations
    fn mass(&self, index: &DofIndex, positions: &Positions) -> FEAResult<Option<ElementMatrix>> {
        let (length, _) = self.geometry(positions)?;
        let half = self.section.mass_per_length(self.material.rho) * length / 2.0;
        if half == 0.0 {
            return Ok(None);
        }

        let all = self.dofs(index)?;
        let dofs: Vec<usize> = all[0..3].iter().chain(&all[6..9]).copied().collect();
        Ok(Some(ElementMatrix::new(
            dofs,
            DMatrix::from_diagonal_element(6, 6, half),
        )))
    }
}
