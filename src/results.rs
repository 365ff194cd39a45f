//! Result types for static and modal analysis

use serde::Serialize;
use std::sync::Arc;

use crate::dof::{DofIndex, DofKey};
use crate::error::{FEAError, FEAResult};
use crate::loads::LoadResultant;
use crate::math::Vector;
use crate::weight::GridPointWeight;

/// Displacement results at a grid point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl GridDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }

    /// Get rotation magnitude
    pub fn rotation_magnitude(&self) -> f64 {
        (self.rx.powi(2) + self.ry.powi(2) + self.rz.powi(2)).sqrt()
    }
}

/// Force of constraint at one DOF
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConstraintForce {
    pub dof: DofKey,
    pub value: f64,
}

impl ConstraintForce {
    /// Pair each index of `rows` with its entry in `values`
    pub(crate) fn collect(index: &DofIndex, rows: &[usize], values: &Vector) -> Vec<Self> {
        rows.iter()
            .zip(values.iter())
            .filter_map(|(&row, &value)| index.key(row).map(|dof| Self { dof, value }))
            .collect()
    }
}

/// Reaction forces summed per grid point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reactions {
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl Reactions {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            fz: arr[2],
            mx: arr[3],
            my: arr[4],
            mz: arr[5],
        }
    }

    /// Get total force magnitude
    pub fn force_magnitude(&self) -> f64 {
        (self.fx.powi(2) + self.fy.powi(2) + self.fz.powi(2)).sqrt()
    }

    /// Get total moment magnitude
    pub fn moment_magnitude(&self) -> f64 {
        (self.mx.powi(2) + self.my.powi(2) + self.mz.powi(2)).sqrt()
    }
}

fn grid_components(index: &DofIndex, id: u32, values: &[f64]) -> FEAResult<[f64; 6]> {
    let base = index
        .grid_base(id)
        .ok_or(FEAError::UnresolvedDof { id, component: 1 })?;
    let mut out = [0.0; 6];
    out.copy_from_slice(&values[base..base + 6]);
    Ok(out)
}

/// Output of one static subcase
#[derive(Debug, Clone, Serialize)]
pub struct StaticSolution {
    #[serde(skip)]
    index: Arc<DofIndex>,
    pub subcase: u32,
    /// DOF key of each entry of `displacements`
    pub dofs: Vec<DofKey>,
    /// Full displacement vector `Ug` in index order
    pub displacements: Vec<f64>,
    /// DOFs constrained by automatic SPC
    pub recovered: Vec<DofKey>,
    pub spc_forces: Vec<ConstraintForce>,
    pub mpc_forces: Vec<ConstraintForce>,
    /// Resultant of the applied load about the basic origin
    pub load_resultant: LoadResultant,
    pub grid_point_weight: Option<GridPointWeight>,
}

impl StaticSolution {
    pub(crate) fn new(
        index: Arc<DofIndex>,
        subcase: u32,
        ug: &Vector,
        recovered: Vec<DofKey>,
        load_resultant: LoadResultant,
    ) -> Self {
        Self {
            dofs: index.keys().to_vec(),
            index,
            subcase,
            displacements: ug.iter().copied().collect(),
            recovered,
            spc_forces: Vec::new(),
            mpc_forces: Vec::new(),
            load_resultant,
            grid_point_weight: None,
        }
    }

    pub fn index(&self) -> &DofIndex {
        &self.index
    }

    /// Displacement of one DOF
    pub fn value(&self, id: u32, component: u8) -> FEAResult<f64> {
        Ok(self.displacements[self.index.dof(id, component)?])
    }

    /// All six components of a grid point
    pub fn grid_displacement(&self, id: u32) -> FEAResult<GridDisplacement> {
        grid_components(&self.index, id, &self.displacements).map(GridDisplacement::from_array)
    }

    /// SPC force at one DOF, `None` when the DOF is not constrained
    pub fn spc_force(&self, id: u32, component: u8) -> Option<f64> {
        let key = DofKey::new(id, component);
        self.spc_forces
            .iter()
            .find(|f| f.dof == key)
            .map(|f| f.value)
    }

    /// SPC forces of a grid point gathered into one record
    pub fn reactions(&self, id: u32) -> FEAResult<Reactions> {
        self.index
            .grid_base(id)
            .ok_or(FEAError::UnresolvedDof { id, component: 1 })?;
        let mut arr = [0.0; 6];
        for force in self.spc_forces.iter().filter(|f| f.dof.id == id) {
            arr[force.dof.component as usize - 1] += force.value;
        }
        Ok(Reactions::from_array(arr))
    }

    /// Largest absolute displacement and its DOF
    pub fn max_displacement(&self) -> Option<(DofKey, f64)> {
        self.dofs
            .iter()
            .zip(self.displacements.iter())
            .map(|(&k, &v)| (k, v))
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
    }
}

/// Output of one modal subcase
#[derive(Debug, Clone, Serialize)]
pub struct ModalSolution {
    #[serde(skip)]
    index: Arc<DofIndex>,
    pub subcase: u32,
    /// Ascending eigenvalues `λ = ω²`
    pub eigenvalues: Vec<f64>,
    /// `ω` in rad/s
    pub angular_frequencies: Vec<f64>,
    /// Cycles in Hz
    pub frequencies: Vec<f64>,
    /// Mass-normalised mode shapes, each of length `N`
    pub mode_shapes: Vec<Vec<f64>>,
    pub recovered: Vec<DofKey>,
    pub grid_point_weight: Option<GridPointWeight>,
}

impl ModalSolution {
    pub(crate) fn new(
        index: Arc<DofIndex>,
        subcase: u32,
        eigenvalues: Vec<f64>,
        mode_shapes: Vec<Vec<f64>>,
        recovered: Vec<DofKey>,
    ) -> Self {
        // small negative eigenvalues of rigid-body modes report as 0 Hz
        let angular_frequencies: Vec<f64> = eigenvalues
            .iter()
            .map(|&lambda| if lambda > 0.0 { lambda.sqrt() } else { 0.0 })
            .collect();
        let frequencies = angular_frequencies
            .iter()
            .map(|w| w / (2.0 * std::f64::consts::PI))
            .collect();
        Self {
            index,
            subcase,
            eigenvalues,
            angular_frequencies,
            frequencies,
            mode_shapes,
            recovered,
            grid_point_weight: None,
        }
    }

    pub fn index(&self) -> &DofIndex {
        &self.index
    }

    pub fn num_modes(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Mode shape `i` (0-based) in index order
    pub fn mode_shape(&self, i: usize) -> Option<&[f64]> {
        self.mode_shapes.get(i).map(|m| m.as_slice())
    }

    /// One DOF of mode `i`
    pub fn mode_value(&self, i: usize, id: u32, component: u8) -> FEAResult<f64> {
        let dof = self.index.dof(id, component)?;
        let shape = self.mode_shape(i).ok_or_else(|| {
            FEAError::Configuration(format!(
                "mode {} requested, {} available",
                i + 1,
                self.num_modes()
            ))
        })?;
        Ok(shape[dof])
    }

    /// Grid point components of mode `i`
    pub fn grid_mode(&self, i: usize, id: u32) -> FEAResult<GridDisplacement> {
        let shape = self.mode_shape(i).ok_or_else(|| {
            FEAError::Configuration(format!(
                "mode {} requested, {} available",
                i + 1,
                self.num_modes()
            ))
        })?;
        grid_components(&self.index, id, shape).map(GridDisplacement::from_array)
    }
}
