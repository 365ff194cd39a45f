//! Degree-of-freedom bookkeeping: the global index and the named subset hierarchy

mod index;
mod sets;

pub use index::{DofIndex, GridLocation};
pub use sets::{DofSets, DofSubset, SetName, UNION_TABLE};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical degree of freedom: `(entity_id, component)`.
///
/// Components run 1..=6 on grid points and are always 1 on scalar points.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DofKey {
    pub id: u32,
    pub component: u8,
}

impl DofKey {
    pub fn new(id: u32, component: u8) -> Self {
        Self { id, component }
    }
}

impl fmt::Display for DofKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.id, self.component)
    }
}

impl From<(u32, u8)> for DofKey {
    fn from((id, component): (u32, u8)) -> Self {
        Self::new(id, component)
    }
}
