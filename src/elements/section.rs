//! Rod section properties (PROD-like)

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Cross-section properties of an axial/torsion rod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Cross-sectional area
    pub a: f64,
    /// Torsional constant
    #[serde(default)]
    pub j: f64,
    /// Nonstructural mass per unit length
    #[serde(default)]
    pub nsm: f64,
}

impl Section {
    pub fn new(a: f64, j: f64) -> Self {
        Self { a, j, nsm: 0.0 }
    }

    /// Add nonstructural mass per unit length
    pub fn with_nsm(mut self, nsm: f64) -> Self {
        self.nsm = nsm;
        self
    }

    /// Solid circular section
    pub fn circular(diameter: f64) -> Self {
        let r = diameter / 2.0;
        Self::new(PI * r.powi(2), PI * r.powi(4) / 2.0)
    }

    /// Hollow circular section (PTUBE-like)
    pub fn tube(outer_diameter: f64, wall_thickness: f64) -> Self {
        let r_o = outer_diameter / 2.0;
        let r_i = r_o - wall_thickness;
        Self::new(
            PI * (r_o.powi(2) - r_i.powi(2)),
            PI * (r_o.powi(4) - r_i.powi(4)) / 2.0,
        )
    }

    /// Mass per unit length for a given density
    pub fn mass_per_length(&self, rho: f64) -> f64 {
        rho * self.a + self.nsm
    }
}
