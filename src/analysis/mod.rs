//! Analysis types, options and subcase selection

mod case;

pub use case::AnalysisCase;

use serde::{Deserialize, Serialize};

/// Type of analysis to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisType {
    /// Linear static solve `K u = f` (SOL 101)
    Static,
    /// Real eigenvalue analysis `K x = λ M x` (SOL 103)
    Modal,
}

impl Default for AnalysisType {
    fn default() -> Self {
        Self::Static
    }
}

/// Storage of the assembled global matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatrixStorage {
    #[default]
    Dense,
    /// COO accumulate, CSR result
    Sparse,
}

/// Reference point for the grid point weight (PARAM,GRDPNT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightReference {
    /// Basic-system origin
    Origin,
    /// Position of a grid point
    Grid(u32),
}

impl WeightReference {
    /// GRDPNT convention: 0 is the origin, anything else a grid id
    pub fn from_grdpnt(value: u32) -> Self {
        if value == 0 {
            WeightReference::Origin
        } else {
            WeightReference::Grid(value)
        }
    }
}

/// Options for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Type of analysis
    pub analysis_type: AnalysisType,
    /// Constrain DOFs with an exactly zero stiffness pivot instead of
    /// failing (PARAM,AUTOSPC)
    pub auto_spc: bool,
    /// Pivots below this fraction of the largest diagonal are reported as
    /// singular when factorisation fails, and logged as ill-conditioned
    /// when it succeeds
    pub pivot_tolerance: f64,
    /// Global matrix storage
    pub storage: MatrixStorage,
    /// Number of modes to keep (None = all)
    pub num_modes: Option<usize>,
    /// Compute the grid point weight about this reference
    pub grid_point_weight: Option<WeightReference>,
    /// Mass scale factor (PARAM,WTMASS)
    pub wtmass: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            analysis_type: AnalysisType::Static,
            auto_spc: true,
            pivot_tolerance: 1e-12,
            storage: MatrixStorage::Dense,
            num_modes: None,
            grid_point_weight: None,
            wtmass: 1.0,
        }
    }
}

impl AnalysisOptions {
    /// Create options for linear static analysis
    pub fn linear() -> Self {
        Self::default()
    }

    /// Create options for modal analysis
    pub fn modal(num_modes: usize) -> Self {
        Self {
            analysis_type: AnalysisType::Modal,
            num_modes: Some(num_modes),
            ..Self::default()
        }
    }

    /// Enable or disable automatic SPC of zero pivots
    pub fn with_auto_spc(mut self, enabled: bool) -> Self {
        self.auto_spc = enabled;
        self
    }

    /// Set the relative pivot tolerance
    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    /// Use sparse matrix storage
    pub fn with_sparse(mut self) -> Self {
        self.storage = MatrixStorage::Sparse;
        self
    }

    /// Request the grid point weight table
    pub fn with_grid_point_weight(mut self, reference: WeightReference) -> Self {
        self.grid_point_weight = Some(reference);
        self
    }

    /// Set the mass scale factor
    pub fn with_wtmass(mut self, wtmass: f64) -> Self {
        self.wtmass = wtmass;
        self
    }
}

/// Case control for one subcase: which constraint and load sets apply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subcase {
    pub id: u32,
    /// Selected SPC set ids
    pub spc: Vec<u32>,
    /// Selected MPC set ids
    pub mpc: Vec<u32>,
    /// Load set or combination id
    pub load: Option<u32>,
}

impl Subcase {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_spc(mut self, set_id: u32) -> Self {
        self.spc.push(set_id);
        self
    }

    pub fn with_mpc(mut self, set_id: u32) -> Self {
        self.mpc.push(set_id);
        self
    }

    pub fn with_load(mut self, load_id: u32) -> Self {
        self.load = Some(load_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AnalysisOptions::default();
        assert!(options.auto_spc);
        assert_eq!(options.wtmass, 1.0);
        assert_eq!(options.storage, MatrixStorage::Dense);
        assert_eq!(AnalysisOptions::modal(4).num_modes, Some(4));
    }

    #[test]
    fn test_partial_options_json() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"auto_spc": false, "storage": "Sparse"}"#).unwrap();
        assert!(!options.auto_spc);
        assert_eq!(options.storage, MatrixStorage::Sparse);
        assert_eq!(options.pivot_tolerance, 1e-12);
    }

    #[test]
    fn test_grdpnt_reference() {
        assert_eq!(WeightReference::from_grdpnt(0), WeightReference::Origin);
        assert_eq!(WeightReference::from_grdpnt(12), WeightReference::Grid(12));
    }
}
