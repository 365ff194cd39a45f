//! Grid points and scalar points - the entities that own degrees of freedom

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{FEAError, FEAResult};

/// A structural grid point with six degrees of freedom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Grid point identifier
    pub id: u32,
    /// X coordinate (basic system)
    pub x: f64,
    /// Y coordinate (basic system)
    pub y: f64,
    /// Z coordinate (basic system)
    pub z: f64,
    /// Coordinate system the position is given in
    #[serde(default)]
    pub cp: u32,
    /// Coordinate system of the displacement components
    #[serde(default)]
    pub cd: u32,
    /// Packed permanently constrained components, e.g. `123456`; 0 = none
    #[serde(default)]
    pub ps: u32,
}

impl GridPoint {
    /// Create a new grid point in the basic system
    pub fn new(id: u32, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            x,
            y,
            z,
            cp: 0,
            cd: 0,
            ps: 0,
        }
    }

    /// Set the permanently constrained components
    pub fn with_ps(mut self, ps: u32) -> Self {
        self.ps = ps;
        self
    }

    /// Set the displacement coordinate system
    pub fn with_cd(mut self, cd: u32) -> Self {
        self.cd = cd;
        self
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Decode the PS field into component numbers, in written order.
    ///
    /// Repeated digits are reported once.
    pub fn permanent_constraints(&self) -> FEAResult<Vec<u8>> {
        decode_components(self.ps).map_err(|digit| {
            FEAError::Configuration(format!(
                "grid {} has PS={} with invalid component {}",
                self.id, self.ps, digit
            ))
        })
    }
}

/// A scalar point carrying a single degree of freedom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarPoint {
    pub id: u32,
}

impl ScalarPoint {
    pub fn new(id: u32) -> Self {
        Self { id }
    }
}

/// Decode a packed component field (`123`, `456`, ...) into components 1..=6.
///
/// On failure the offending digit is returned.
pub fn decode_components(packed: u32) -> Result<Vec<u8>, u8> {
    let mut components = Vec::new();
    if packed == 0 {
        return Ok(components);
    }
    for ch in packed.to_string().chars() {
        let digit = ch as u8 - b'0';
        if !(1..=6).contains(&digit) {
            return Err(digit);
        }
        if !components.contains(&digit) {
            components.push(digit);
        }
    }
    Ok(components)
}
