//! Applied load resultant about a reference point (OLOAD resultant)

use nalgebra::Vector3;
use serde::Serialize;

use crate::dof::DofIndex;
use crate::math::Vector;

/// Total force and moment of a load vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadResultant {
    pub reference: [f64; 3],
    pub force: [f64; 3],
    pub moment: [f64; 3],
}

impl LoadResultant {
    /// Sum grid forces and moments of `fg` about `reference`.
    ///
    /// Scalar point loads have no direction and are not included.
    pub fn from_vector(fg: &Vector, index: &DofIndex, reference: Vector3<f64>) -> Self {
        let mut force = Vector3::zeros();
        let mut moment = Vector3::zeros();

        for grid in index.grids() {
            let f = Vector3::new(fg[grid.base], fg[grid.base + 1], fg[grid.base + 2]);
            let m = Vector3::new(fg[grid.base + 3], fg[grid.base + 4], fg[grid.base + 5]);
            force += f;
            moment += m + (grid.position - reference).cross(&f);
        }

        Self {
            reference: reference.into(),
            force: force.into(),
            moment: moment.into(),
        }
    }
}
