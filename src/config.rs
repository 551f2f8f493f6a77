//! Transform configuration
//!
//! The pivot/orientation/snap record every group build and tool reads. It is
//! passed by value, never read from global state. Stored as RON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HandleResult;
use crate::group::{HandleOrientation, PivotPoint};
use crate::math::snap_value;

/// Default move snap increment (world units)
pub const DEFAULT_SNAP_VALUE: f32 = 0.25;

/// Default rotation snap increment (degrees)
pub const DEFAULT_ROTATION_SNAP: f32 = 15.0;

/// Options recognized by the transform engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub pivot_point: PivotPoint,
    pub orientation: HandleOrientation,
    pub snap_enabled: bool,
    /// Translation grid increment
    pub snap_value: f32,
    /// Rotation increment in degrees, used when snapping is enabled
    pub rotation_snap: f32,
    /// Snap translation onto the vertex under the cursor
    pub vertex_snap: bool,
    /// Weld distance for building coincident indices from positions
    pub coincident_epsilon: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            pivot_point: PivotPoint::WorldBoundingBoxCenter,
            orientation: HandleOrientation::Global,
            snap_enabled: false,
            snap_value: DEFAULT_SNAP_VALUE,
            rotation_snap: DEFAULT_ROTATION_SNAP,
            vertex_snap: false,
            coincident_epsilon: 0.0001,
        }
    }
}

impl TransformConfig {
    /// Set pivot point (builder pattern)
    pub fn with_pivot(mut self, pivot_point: PivotPoint) -> Self {
        self.pivot_point = pivot_point;
        self
    }

    /// Set orientation (builder pattern)
    pub fn with_orientation(mut self, orientation: HandleOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Enable grid snapping with an increment (builder pattern)
    pub fn with_snap(mut self, snap_value: f32) -> Self {
        self.snap_enabled = true;
        self.snap_value = snap_value;
        self
    }

    /// Snap a scalar to the translation grid if snapping is on
    pub fn snap(&self, value: f32) -> f32 {
        if self.snap_enabled {
            snap_value(value, self.snap_value)
        } else {
            value
        }
    }

    /// Snap an angle (radians) to the rotation increment if snapping is on
    pub fn snap_angle(&self, radians: f32) -> f32 {
        if self.snap_enabled {
            snap_value(radians, self.rotation_snap.to_radians())
        } else {
            radians
        }
    }

    pub fn from_ron_str(data: &str) -> HandleResult<Self> {
        Ok(ron::from_str(data)?)
    }

    pub fn to_ron_string(&self) -> HandleResult<String> {
        let config = ron::ser::PrettyConfig::new().depth_limit(2);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> HandleResult<Self> {
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&data)?;
        log::debug!("loaded transform config from {}", path.display());
        Ok(config)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> HandleResult<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}
