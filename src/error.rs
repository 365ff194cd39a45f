//! Error types for the constrained solver core

use thiserror::Error;

use crate::dof::DofKey;

/// Main error type for FEA operations
#[derive(Error, Debug)]
pub enum FEAError {
    /// Unusable model setup (zero DOFs, unsupported coordinate system, bad record)
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unresolved DOF: entity {id} component {component} is not in the DOF index")]
    UnresolvedDof { id: u32, component: u8 },

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Singular matrix - offending DOFs: [{}]", format_dofs(.dofs))]
    SingularMatrix { dofs: Vec<DofKey> },

    #[error("DOF index {index} appears in more than one input of set '{set}'")]
    DuplicateDof { set: String, index: usize },

    #[error("Load set {0} not found in model")]
    LoadSetNotFound(u32),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn format_dofs(dofs: &[DofKey]) -> String {
    dofs.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for FEA operations
pub type FEAResult<T> = Result<T, FEAError>;
