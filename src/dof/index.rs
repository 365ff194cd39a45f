//! Global DOF index: `(entity_id, component)` to contiguous matrix slots

use log::debug;
use nalgebra::Vector3;
use std::collections::HashMap;

use super::{DofKey, DofSubset};
use crate::elements::{GridPoint, ScalarPoint};
use crate::error::{FEAError, FEAResult};

/// Where a grid point lives in the index and in space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLocation {
    pub id: u32,
    /// Index of component 1; components 2..=6 follow contiguously
    pub base: usize,
    pub position: Vector3<f64>,
}

/// Bijection between physical DOFs and `[0, N)`.
///
/// Grid points occupy the first `6 * n_grid` slots in insertion order, scalar
/// points follow. The index is immutable once built.
#[derive(Debug, Clone, Default)]
pub struct DofIndex {
    lookup: HashMap<DofKey, usize>,
    keys: Vec<DofKey>,
    grids: Vec<GridLocation>,
    grid_lookup: HashMap<u32, usize>,
}

impl DofIndex {
    /// Build the index and the `sg` subset (PS-field constraints at zero value).
    pub fn build(
        grids: &[GridPoint],
        scalar_points: &[ScalarPoint],
    ) -> FEAResult<(Self, DofSubset)> {
        let mut index = Self::default();
        let mut sg = DofSubset::valued();

        for grid in grids {
            if grid.cp != 0 || grid.cd != 0 {
                return Err(FEAError::Configuration(format!(
                    "grid {} uses coordinate system cp={} cd={}; only the basic system (0) is supported",
                    grid.id, grid.cp, grid.cd
                )));
            }
            if index.grid_lookup.contains_key(&grid.id) {
                return Err(FEAError::Configuration(format!(
                    "duplicate grid point id {}",
                    grid.id
                )));
            }

            let base = index.keys.len();
            for component in 1..=6u8 {
                index.insert(DofKey::new(grid.id, component));
            }
            for component in grid.permanent_constraints()? {
                sg.push_value(base + component as usize - 1, 0.0);
            }

            index.grid_lookup.insert(grid.id, index.grids.len());
            index.grids.push(GridLocation {
                id: grid.id,
                base,
                position: grid.position(),
            });
        }

        for point in scalar_points {
            let key = DofKey::new(point.id, 1);
            if index.lookup.contains_key(&key) {
                return Err(FEAError::Configuration(format!(
                    "scalar point id {} collides with an existing grid or scalar point",
                    point.id
                )));
            }
            index.insert(key);
        }

        if index.keys.is_empty() {
            return Err(FEAError::Configuration(
                "model has no degrees of freedom".to_string(),
            ));
        }

        debug!(
            "DOF index: {} grids, {} scalar points, N = {}, |sg| = {}",
            index.grid_count(),
            index.scalar_count(),
            index.len(),
            sg.len()
        );
        Ok((index, sg))
    }

    fn insert(&mut self, key: DofKey) {
        self.lookup.insert(key, self.keys.len());
        self.keys.push(key);
    }

    /// Total number of DOFs, `N`
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Matrix index of `(id, component)`
    pub fn dof(&self, id: u32, component: u8) -> FEAResult<usize> {
        self.lookup
            .get(&DofKey::new(id, component))
            .copied()
            .ok_or(FEAError::UnresolvedDof { id, component })
    }

    pub fn dof_of(&self, key: DofKey) -> FEAResult<usize> {
        self.dof(key.id, key.component)
    }

    /// Physical DOF stored at a matrix index
    pub fn key(&self, index: usize) -> Option<DofKey> {
        self.keys.get(index).copied()
    }

    pub fn keys(&self) -> &[DofKey] {
        &self.keys
    }

    /// Map matrix indices back to physical DOFs for diagnostics
    pub fn keys_of(&self, indices: &[usize]) -> Vec<DofKey> {
        indices.iter().filter_map(|&i| self.key(i)).collect()
    }

    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    pub fn scalar_count(&self) -> usize {
        self.keys.len() - 6 * self.grids.len()
    }

    /// Grid locations in insertion order
    pub fn grids(&self) -> &[GridLocation] {
        &self.grids
    }

    pub fn grid(&self, id: u32) -> Option<&GridLocation> {
        self.grid_lookup.get(&id).map(|&i| &self.grids[i])
    }

    /// Index of component 1 of a grid point
    pub fn grid_base(&self, id: u32) -> Option<usize> {
        self.grid(id).map(|g| g.base)
    }

    /// True when the index belongs to a scalar point
    pub fn is_scalar(&self, index: usize) -> bool {
        index >= 6 * self.grids.len() && index < self.keys.len()
    }
}
