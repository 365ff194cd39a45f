//! Single-point and multi-point constraint records

mod resolver;

pub use resolver::{ConstraintResolver, MpcTerm, ResolvedConstraints};

use serde::{Deserialize, Serialize};

use crate::dof::DofKey;
use crate::elements::grid::decode_components;
use crate::error::{FEAError, FEAResult};

/// A single-point constraint: every listed DOF is driven to `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpcRecord {
    /// SPC set this record belongs to
    pub set_id: u32,
    pub dofs: Vec<DofKey>,
    /// Enforced value
    #[serde(default)]
    pub value: f64,
    /// Applied whether or not the case selects `set_id`
    #[serde(default)]
    pub always_active: bool,
}

impl SpcRecord {
    /// One DOF with an enforced value (SPC form)
    pub fn single(set_id: u32, id: u32, component: u8, value: f64) -> Self {
        Self {
            set_id,
            dofs: vec![DofKey::new(id, component)],
            value,
            always_active: false,
        }
    }

    /// Packed components on a list of points, zero value (SPC1 form)
    pub fn spc1(set_id: u32, components: u32, ids: &[u32]) -> FEAResult<Self> {
        let components = decode_components(components).map_err(|digit| {
            FEAError::Configuration(format!(
                "SPC1 set {} has invalid component {}",
                set_id, digit
            ))
        })?;
        let dofs = ids
            .iter()
            .flat_map(|&id| components.iter().map(move |&c| DofKey::new(id, c)))
            .collect();
        Ok(Self {
            set_id,
            dofs,
            value: 0.0,
            always_active: false,
        })
    }

    /// Mark the record as effective independent of case selection
    pub fn always_active(mut self) -> Self {
        self.always_active = true;
        self
    }
}

/// A multi-point constraint `Σ cᵢ·uᵢ = 0`; the first term is dependent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpcRecord {
    pub set_id: u32,
    pub terms: Vec<(DofKey, f64)>,
}

impl MpcRecord {
    pub fn new(set_id: u32) -> Self {
        Self {
            set_id,
            terms: Vec::new(),
        }
    }

    /// Append a term; the first one added is the dependent DOF
    pub fn with_term(mut self, id: u32, component: u8, coefficient: f64) -> Self {
        self.terms.push((DofKey::new(id, component), coefficient));
        self
    }

    pub fn dependent(&self) -> Option<(DofKey, f64)> {
        self.terms.first().copied()
    }
}
