//! Load combinations

use serde::{Deserialize, Serialize};

/// A load combination: `scale * Σ factorᵢ * load_setᵢ` (LOAD card semantics)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Id under which the combination is selected
    pub set_id: u32,
    /// Overall scale factor
    pub scale: f64,
    /// `(factor, load_set_id)` members
    pub members: Vec<(f64, u32)>,
}

impl LoadCombination {
    /// Create a new load combination
    pub fn new(set_id: u32, scale: f64) -> Self {
        Self {
            set_id,
            scale,
            members: Vec::new(),
        }
    }

    /// Add a load set with a factor
    pub fn with_set(mut self, load_set: u32, factor: f64) -> Self {
        self.members.push((factor, load_set));
        self
    }
}
