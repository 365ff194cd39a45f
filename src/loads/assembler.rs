//! Reduce load records to elementary loads and assemble `Fg`

use log::debug;
use serde::Serialize;

use super::{LoadCombination, LoadRecord};
use crate::dof::DofIndex;
use crate::error::{FEAError, FEAResult};
use crate::math::Vector;

/// A single `(entity_id, component, magnitude)` contribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElementaryLoad {
    pub id: u32,
    pub component: u8,
    pub magnitude: f64,
}

/// Builds the global load vector for one load selection
pub struct LoadAssembler<'a> {
    index: &'a DofIndex,
}

impl<'a> LoadAssembler<'a> {
    pub fn new(index: &'a DofIndex) -> Self {
        Self { index }
    }

    /// Expand a load selection into elementary loads.
    ///
    /// `load_id` names either a combination or a plain load set.
    pub fn resolve(
        &self,
        load_id: u32,
        loads: &[LoadRecord],
        combinations: &[LoadCombination],
    ) -> FEAResult<Vec<ElementaryLoad>> {
        let mut out = Vec::new();

        if let Some(combo) = combinations.iter().find(|c| c.set_id == load_id) {
            for &(factor, member) in &combo.members {
                expand_set(member, combo.scale * factor, loads, &mut out)?;
            }
        } else {
            expand_set(load_id, 1.0, loads, &mut out)?;
        }

        debug!("load set {}: {} elementary loads", load_id, out.len());
        Ok(out)
    }

    /// Scatter elementary loads into a length-`N` vector
    pub fn assemble(&self, elementary: &[ElementaryLoad]) -> FEAResult<Vector> {
        let mut fg = Vector::zeros(self.index.len());
        for load in elementary {
            fg[self.index.dof(load.id, load.component)?] += load.magnitude;
        }
        Ok(fg)
    }
}

fn expand_set(
    set_id: u32,
    factor: f64,
    loads: &[LoadRecord],
    out: &mut Vec<ElementaryLoad>,
) -> FEAResult<()> {
    let mut found = false;
    for record in loads.iter().filter(|r| r.set_id() == set_id) {
        found = true;
        match record {
            LoadRecord::Force {
                grid,
                scale,
                direction,
                ..
            } => push_vector(out, *grid, 1, factor * scale, direction),
            LoadRecord::Moment {
                grid,
                scale,
                direction,
                ..
            } => push_vector(out, *grid, 4, factor * scale, direction),
            LoadRecord::ScalarLoad {
                point, magnitude, ..
            } => {
                let value = factor * magnitude;
                if value != 0.0 {
                    out.push(ElementaryLoad {
                        id: *point,
                        component: 1,
                        magnitude: value,
                    });
                }
            }
            LoadRecord::Gravity { .. } | LoadRecord::Pressure { .. } => {
                return Err(FEAError::UnsupportedFeature(format!(
                    "{} load in set {}",
                    record.kind(),
                    set_id
                )));
            }
        }
    }

    if !found {
        return Err(FEAError::LoadSetNotFound(set_id));
    }
    Ok(())
}

fn push_vector(
    out: &mut Vec<ElementaryLoad>,
    grid: u32,
    first_component: u8,
    scale: f64,
    direction: &[f64; 3],
) {
    for (k, d) in direction.iter().enumerate() {
        let value = scale * d;
        if value != 0.0 {
            out.push(ElementaryLoad {
                id: grid,
                component: first_component + k as u8,
                magnitude: value,
            });
        }
    }
}
