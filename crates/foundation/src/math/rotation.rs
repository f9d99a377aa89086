//! View rotations in the editor's canvas axes and in the persisted axes.
//!
//! Canvas axes: `x` = tilt, `y` = pan, `z` = roll.
//! Storage axes are what external 3D viewers consume. The mapping between
//! the two is a pure sign/permutation and therefore exact:
//!
//! ```text
//! storage.x = -canvas.z    canvas.x = storage.z
//! storage.y =  canvas.y    canvas.y = storage.y
//! storage.z =  canvas.x    canvas.z = -storage.x
//! ```

use serde::{Deserialize, Serialize};

use super::angle::{clamp_tilt, wrap_degrees_360};

/// Live edit-time rotation in canvas axes (degrees).
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewRotation {
    /// Tilt, kept in `[-90, 90]` by [`ViewRotation::normalized`].
    pub x: f64,
    /// Pan, kept in `[0, 360)` by [`ViewRotation::normalized`].
    pub y: f64,
    /// Roll, unconstrained.
    pub z: f64,
}

impl ViewRotation {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Applies the view invariants: tilt clamped, pan wrapped.
    pub fn normalized(self) -> Self {
        Self {
            x: clamp_tilt(self.x),
            y: wrap_degrees_360(self.y),
            z: self.z,
        }
    }

    /// Adds a pan/tilt delta and re-applies the view invariants.
    pub fn nudged(self, d_pan: f64, d_tilt: f64) -> Self {
        Self {
            x: self.x + d_tilt,
            y: self.y + d_pan,
            z: self.z,
        }
        .normalized()
    }

    pub fn to_storage(self) -> StorageRotation {
        StorageRotation {
            x: -self.z,
            y: self.y,
            z: self.x,
        }
    }
}

/// Rotation as persisted on an asset (degrees, storage axes).
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageRotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl StorageRotation {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Remaps to canvas axes without touching the values.
    pub fn to_view(self) -> ViewRotation {
        ViewRotation {
            x: self.z,
            y: self.y,
            z: -self.x,
        }
    }
}

impl From<ViewRotation> for StorageRotation {
    fn from(v: ViewRotation) -> Self {
        v.to_storage()
    }
}

impl From<StorageRotation> for ViewRotation {
    fn from(s: StorageRotation) -> Self {
        s.to_view()
    }
}
