//! Scalar spring between two DOFs, or from one DOF to ground

use serde::{Deserialize, Serialize};

use super::{scalar_dofs, scalar_pair, ElementMatrix, ElementProvider, Positions};
use crate::dof::{DofIndex, DofKey};
use crate::error::FEAResult;

/// A CELAS-like spring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarSpring {
    pub id: u32,
    pub k: f64,
    pub a: DofKey,
    /// `None` grounds the spring
    #[serde(default)]
    pub b: Option<DofKey>,
}

impl ScalarSpring {
    pub fn new(id: u32, k: f64, a: DofKey, b: DofKey) -> Self {
        Self {
            id,
            k,
            a,
            b: Some(b),
        }
    }

    pub fn grounded(id: u32, k: f64, a: DofKey) -> Self {
        Self {
            id,
            k,
            a,
            b: None,
        }
    }
}

impl ElementProvider for ScalarSpring {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> &'static str {
        "CELAS"
    }

    fn stiffness(&self, index: &DofIndex, _positions: &Positions) -> FEAResult<ElementMatrix> {
        let dofs = scalar_dofs(index, self.a, self.b)?;
        let matrix = scalar_pair(self.k, dofs.len());
        Ok(ElementMatrix::new(dofs, matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{GridPoint, ScalarPoint};
    use crate::error::FEAError;

    #[test]
    fn test_spring_between_grid_and_scalar_point() {
        let (index, _) =
            DofIndex::build(&[GridPoint::new(1, 0.0, 0.0, 0.0)], &[ScalarPoint::new(9)]).unwrap();
        let spring = ScalarSpring::new(4, 5.0, DofKey::new(1, 3), DofKey::new(9, 1));
        let ke = spring.stiffness(&index, &Positions::new()).unwrap();

        assert_eq!(ke.dofs, vec![2, 6]);
        assert_eq!(ke.matrix[(0, 0)], 5.0);
        assert_eq!(ke.matrix[(1, 0)], -5.0);
    }

    #[test]
    fn test_grounded_spring() {
        let (index, _) = DofIndex::build(&[], &[ScalarPoint::new(9)]).unwrap();
        let ke = ScalarSpring::grounded(1, 2.5, DofKey::new(9, 1))
            .stiffness(&index, &Positions::new())
            .unwrap();
        assert_eq!(ke.size(), 1);
        assert_eq!(ke.matrix[(0, 0)], 2.5);

        let bad = ScalarSpring::grounded(2, 1.0, DofKey::new(9, 2));
        assert!(matches!(
            bad.stiffness(&index, &Positions::new()),
            Err(FEAError::UnresolvedDof { id: 9, component: 2 })
        ));
    }
}
