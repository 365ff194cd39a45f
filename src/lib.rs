//! FEA Core - constrained linear algebra for static and normal-modes analysis
//!
//! This library maps physical degrees of freedom to matrix indices and
//! carries them through the classical Nastran set hierarchy:
//! - DOF indexing of grid and scalar points
//! - SPC / MPC resolution and the derived set hierarchy (`s`, `m`, `n`, `a`, ...)
//! - Dense or sparse assembly of `Kgg`, `Mgg` and `Fg`
//! - Partitioned static solution with automatic SPC of zero pivots
//! - Real eigenvalue analysis (SOL 103)
//! - Grid point weight (GPWG) mass properties
//!
//! ## Example
//! ```rust
//! use fea_core::prelude::*;
//!
//! let mut model = Model::new();
//! model.add_grid(GridPoint::new(1, 0.0, 0.0, 0.0)).unwrap();
//! model.add_grid(GridPoint::new(2, 1.0, 0.0, 0.0).with_ps(23456)).unwrap();
//!
//! let rod = Rod::new(1, 1, 2, Material::steel(), Section::new(1.0e-4, 0.0));
//! model.add_element(Box::new(rod)).unwrap();
//!
//! model.add_spc(SpcRecord::spc1(1, 123456, &[1]).unwrap()).unwrap();
//! model.add_load(LoadRecord::force(10, 2, 1000.0, [1.0, 0.0, 0.0])).unwrap();
//!
//! let subcase = Subcase::new(1).with_spc(1).with_load(10);
//! let solution = model.analyze_static(&subcase, &AnalysisOptions::linear()).unwrap();
//! let ux = solution.value(2, 1).unwrap();
//! assert!(ux > 0.0);
//! ```

pub mod analysis;
pub mod assembly;
pub mod constraints;
pub mod dof;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;
pub mod solver;
pub mod weight;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, AnalysisType, MatrixStorage, Subcase, WeightReference};
    pub use crate::constraints::{MpcRecord, SpcRecord};
    pub use crate::dof::{DofIndex, DofKey, SetName};
    pub use crate::elements::{
        ElementMatrix, ElementProvider, GridPoint, Material, PointMass, Rod, ScalarMass,
        ScalarPoint, ScalarSpring, Section,
    };
    pub use crate::error::{FEAError, FEAResult};
    pub use crate::loads::{LoadCombination, LoadRecord};
    pub use crate::model::{Model, ModelDeck, SubcaseSolution};
    pub use crate::results::{GridDisplacement, ModalSolution, Reactions, StaticSolution};
    pub use crate::weight::GridPointWeight;
}
