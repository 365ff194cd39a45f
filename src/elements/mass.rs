//! Concentrated and scalar mass elements

use nalgebra::{DMatrix, Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::{grid_dofs, scalar_dofs, scalar_pair, ElementMatrix, ElementProvider, Positions};
use crate::dof::{DofIndex, DofKey};
use crate::error::FEAResult;
use crate::math::skew;

/// A CMASS-like scalar mass, grounded or between two DOFs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarMass {
    pub id: u32,
    pub m: f64,
    pub a: DofKey,
    #[serde(default)]
    pub b: Option<DofKey>,
}

impl ScalarMass {
    pub fn grounded(id: u32, m: f64, a: DofKey) -> Self {
        Self {
            id,
            m,
            a,
            b: None,
        }
    }

    pub fn new(id: u32, m: f64, a: DofKey, b: DofKey) -> Self {
        Self {
            id,
            m,
            a,
            b: Some(b),
        }
    }

    fn dofs(&self, index: &DofIndex) -> FEAResult<Vec<usize>> {
        scalar_dofs(index, self.a, self.b)
    }
}

impl ElementProvider for ScalarMass {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> &'static str {
        "CMASS"
    }

    fn stiffness(&self, index: &DofIndex, _positions: &Positions) -> FEAResult<ElementMatrix> {
        let dofs = self.dofs(index)?;
        let n = dofs.len();
        Ok(ElementMatrix::new(dofs, DMatrix::zeros(n, n)))
    }

    fn mass(&self, index: &DofIndex, _positions: &Positions) -> FEAResult<Option<ElementMatrix>> {
        let dofs = self.dofs(index)?;
        let matrix = scalar_pair(self.m, dofs.len());
        Ok(Some(ElementMatrix::new(dofs, matrix)))
    }
}

/// A CONM2-like concentrated mass on a grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMass {
    pub id: u32,
    pub grid: u32,
    pub mass: f64,
    /// Offset from the grid to the mass centre
    #[serde(default)]
    pub offset: [f64; 3],
    /// `[I11, I21, I22, I31, I32, I33]` about the mass centre
    #[serde(default)]
    pub inertia: [f64; 6],
}

impl PointMass {
    pub fn new(id: u32, grid: u32, mass: f64) -> Self {
        Self {
            id,
            grid,
            mass,
            offset: [0.0; 3],
            inertia: [0.0; 6],
        }
    }

    pub fn with_offset(mut self, offset: [f64; 3]) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_inertia(mut self, inertia: [f64; 6]) -> Self {
        self.inertia = inertia;
        self
    }

    /// Inertia tensor; off-diagonal products enter with a minus sign
    fn inertia_tensor(&self) -> Matrix3<f64> {
        let [i11, i21, i22, i31, i32, i33] = self.inertia;
        Matrix3::new(i11, -i21, -i31, -i21, i22, -i32, -i31, -i32, i33)
    }

    /// 6×6 mass matrix at the grid point
    pub fn matrix(&self) -> DMatrix<f64> {
        let m = self.mass;
        let ox = skew(&Vector3::from(self.offset));

        let tr = ox * -m;
        let rr = ox * ox * -m + self.inertia_tensor();

        let mut mm = DMatrix::zeros(6, 6);
        for i in 0..3 {
            mm[(i, i)] = m;
            for j in 0..3 {
                mm[(i, 3 + j)] = tr[(i, j)];
                mm[(3 + j, i)] = tr[(i, j)];
                mm[(3 + i, 3 + j)] = rr[(i, j)];
            }
        }
        mm
    }
}

impl ElementProvider for PointMass {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> &'static str {
        "CONM2"
    }

    fn stiffness(&self, index: &DofIndex, _positions: &Positions) -> FEAResult<ElementMatrix> {
        let dofs = grid_dofs(index, self.grid)?.to_vec();
        Ok(ElementMatrix::new(dofs, DMatrix::zeros(6, 6)))
    }

    fn mass(&self, index: &DofIndex, _positions: &Positions) -> FEAResult<Option<ElementMatrix>> {
        let dofs = grid_dofs(index, self.grid)?.to_vec();
        Ok(Some(ElementMatrix::new(dofs, self.matrix())))
    }
}
