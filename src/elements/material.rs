//! Isotropic material properties (MAT1-like)

use serde::{Deserialize, Serialize};

/// Material properties for rod stiffness and mass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity
    pub e: f64,
    /// Shear modulus
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Mass density
    #[serde(default)]
    pub rho: f64,
}

impl Material {
    /// Create a new material with given properties
    pub fn new(e: f64, g: f64, nu: f64, rho: f64) -> Self {
        Self { e, g, nu, rho }
    }

    /// Create a new isotropic material from E and nu
    /// G is calculated as E / (2 * (1 + nu))
    pub fn isotropic(e: f64, nu: f64, rho: f64) -> Self {
        let g = e / (2.0 * (1.0 + nu));
        Self::new(e, g, nu, rho)
    }

    /// Structural steel in SI units
    pub fn steel() -> Self {
        Self::new(200e9, 77e9, 0.3, 7850.0)
    }

    /// 6061-T6 aluminium in SI units
    pub fn aluminum() -> Self {
        Self::new(68.9e9, 26e9, 0.33, 2700.0)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}
