//! Load records - forces, moments and scalar loads applied at points

use serde::{Deserialize, Serialize};

/// One load record belonging to a load set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoadRecord {
    /// `scale * direction` on translations 1-3 of a grid (FORCE)
    Force {
        set_id: u32,
        grid: u32,
        scale: f64,
        direction: [f64; 3],
    },
    /// `scale * direction` on rotations 4-6 of a grid (MOMENT)
    Moment {
        set_id: u32,
        grid: u32,
        scale: f64,
        direction: [f64; 3],
    },
    /// Magnitude on a scalar point (SLOAD)
    ScalarLoad {
        set_id: u32,
        point: u32,
        magnitude: f64,
    },
    /// Acceleration field (GRAV)
    Gravity {
        set_id: u32,
        scale: f64,
        direction: [f64; 3],
    },
    /// Surface pressure on an element (PLOAD)
    Pressure {
        set_id: u32,
        element: u32,
        pressure: f64,
    },
}

impl LoadRecord {
    /// Create a force on a grid point
    pub fn force(set_id: u32, grid: u32, scale: f64, direction: [f64; 3]) -> Self {
        LoadRecord::Force {
            set_id,
            grid,
            scale,
            direction,
        }
    }

    /// Create a moment on a grid point
    pub fn moment(set_id: u32, grid: u32, scale: f64, direction: [f64; 3]) -> Self {
        LoadRecord::Moment {
            set_id,
            grid,
            scale,
            direction,
        }
    }

    /// Create a load on a scalar point
    pub fn scalar(set_id: u32, point: u32, magnitude: f64) -> Self {
        LoadRecord::ScalarLoad {
            set_id,
            point,
            magnitude,
        }
    }

    pub fn set_id(&self) -> u32 {
        match self {
            LoadRecord::Force { set_id, .. }
            | LoadRecord::Moment { set_id, .. }
            | LoadRecord::ScalarLoad { set_id, .. }
            | LoadRecord::Gravity { set_id, .. }
            | LoadRecord::Pressure { set_id, .. } => *set_id,
        }
    }

    /// Card-style name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            LoadRecord::Force { .. } => "FORCE",
            LoadRecord::Moment { .. } => "MOMENT",
            LoadRecord::ScalarLoad { .. } => "SLOAD",
            LoadRecord::Gravity { .. } => "GRAV",
            LoadRecord::Pressure { .. } => "PLOAD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accessors() {
        let f = LoadRecord::force(3, 10, 2.0, [1.0, 0.0, 0.0]);
        assert_eq!(f.set_id(), 3);
        assert_eq!(f.kind(), "FORCE");
        assert_eq!(LoadRecord::scalar(4, 9, 1.0).kind(), "SLOAD");
    }

    #[test]
    fn test_record_json_tag() {
        let json = r#"{"type": "Moment", "set_id": 1, "grid": 2, "scale": 5.0, "direction": [0.0, 0.0, 1.0]}"#;
        let record: LoadRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, LoadRecord::moment(1, 2, 5.0, [0.0, 0.0, 1.0]));
    }
}
