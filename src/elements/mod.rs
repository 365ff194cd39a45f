//! Element providers and the entities that own degrees of freedom.
//!
//! The assembler only sees [`ElementProvider`]: an element reports its
//! stiffness (and optionally mass) as a square matrix plus the global DOF
//! index of every row/column.

pub mod grid;
mod mass;
mod material;
mod rod;
mod section;
mod spring;

pub use grid::{GridPoint, ScalarPoint};
pub use mass::{PointMass, ScalarMass};
pub use material::Material;
pub use rod::Rod;
pub use section::Section;
pub use spring::ScalarSpring;

use nalgebra::{DMatrix, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::dof::{DofIndex, DofKey};
use crate::error::{FEAError, FEAResult};

/// Grid positions keyed by grid id
pub type Positions = HashMap<u32, Vector3<f64>>;

/// An element matrix and the global DOF index of each of its rows
#[derive(Debug, Clone, PartialEq)]
pub struct ElementMatrix {
    pub dofs: Vec<usize>,
    pub matrix: DMatrix<f64>,
}

impl ElementMatrix {
    pub fn new(dofs: Vec<usize>, matrix: DMatrix<f64>) -> Self {
        Self { dofs, matrix }
    }

    pub fn size(&self) -> usize {
        self.dofs.len()
    }
}

/// Anything that contributes stiffness and mass to the global system
pub trait ElementProvider: Send + Sync + fmt::Debug {
    fn id(&self) -> u32;

    /// Short card-style name used in diagnostics
    fn kind(&self) -> &'static str;

    fn stiffness(&self, index: &DofIndex, positions: &Positions) -> FEAResult<ElementMatrix>;

    /// Mass contribution; `None` for massless elements
    fn mass(&self, _index: &DofIndex, _positions: &Positions) -> FEAResult<Option<ElementMatrix>> {
        Ok(None)
    }
}

/// Serializable form of the built-in element kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementRecord {
    Rod(Rod),
    ScalarSpring(ScalarSpring),
    ScalarMass(ScalarMass),
    PointMass(PointMass),
}

impl ElementRecord {
    pub fn into_provider(self) -> Box<dyn ElementProvider> {
        match self {
            ElementRecord::Rod(e) => Box::new(e),
            ElementRecord::ScalarSpring(e) => Box::new(e),
            ElementRecord::ScalarMass(e) => Box::new(e),
            ElementRecord::PointMass(e) => Box::new(e),
        }
    }
}

/// Position of a grid, or `UnresolvedDof` if it is not in the model
pub(crate) fn position_of(positions: &Positions, id: u32) -> FEAResult<Vector3<f64>> {
    positions
        .get(&id)
        .copied()
        .ok_or(FEAError::UnresolvedDof { id, component: 1 })
}

/// The six DOF indices of a grid point
pub(crate) fn grid_dofs(index: &DofIndex, id: u32) -> FEAResult<[usize; 6]> {
    let mut dofs = [0; 6];
    for (c, dof) in dofs.iter_mut().enumerate() {
        *dof = index.dof(id, c as u8 + 1)?;
    }
    Ok(dofs)
}

/// Index list for a grounded or two-ended scalar element
pub(crate) fn scalar_dofs(
    index: &DofIndex,
    a: DofKey,
    b: Option<DofKey>,
) -> FEAResult<Vec<usize>> {
    let mut dofs = vec![index.dof_of(a)?];
    if let Some(b) = b {
        dofs.push(index.dof_of(b)?);
    }
    Ok(dofs)
}

/// `[[v, -v], [-v, v]]`, or `[[v]]` when grounded
pub(crate) fn scalar_pair(value: f64, size: usize) -> DMatrix<f64> {
    if size == 1 {
        DMatrix::from_element(1, 1, value)
    } else {
        DMatrix::from_row_slice(2, 2, &[value, -value, -value, value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_deserialize_by_tag() {
        let json = r#"[
            {"type": "ScalarSpring", "id": 1, "k": 10.0, "a": {"id": 5, "component": 1}},
            {"type": "ScalarMass", "id": 2, "m": 2.0, "a": {"id": 5, "component": 1}}
        ]"#;
        let records: Vec<ElementRecord> = serde_json::from_str(json).unwrap();
        let providers: Vec<_> = records.into_iter().map(|r| r.into_provider()).collect();
        assert_eq!(providers[0].kind(), "CELAS");
        assert_eq!(providers[1].kind(), "CMASS");
        assert_eq!(providers[1].id(), 2);
    }

    #[test]
    fn test_scalar_pair() {
        assert_eq!(scalar_pair(3.0, 1), DMatrix::from_element(1, 1, 3.0));
        assert_eq!(scalar_pair(3.0, 2)[(0, 1)], -3.0);
    }
}
