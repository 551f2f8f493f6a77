//! Rotate Tool
//!
//! Rotates positions about each group's pivot by the handle's accumulated
//! rotation since the edit began.

use crate::apply::{Delta, DeltaFrame};
use crate::math::Quat;
use crate::session::InputSample;

use super::ToolContext;

/// How the handle rotation is related to each group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationPivot {
    /// Delta expressed in the group's basis (`R_origin^-1 * R_current`)
    #[default]
    GroupBasis,
    /// Raw world delta of the handle (`R_current * R_origin^-1`) about the pivot
    Handle,
}

#[derive(Debug, Clone, Default)]
pub struct RotateTool {
    pub about: RotationPivot,
}

impl RotateTool {
    pub fn new(about: RotationPivot) -> Self {
        Self { about }
    }

    /// Snap the rotation angle, keeping its axis
    fn snap(rotation: Quat, ctx: &ToolContext) -> Quat {
        if !ctx.config.snap_enabled {
            return rotation;
        }
        let (axis, angle) = rotation.to_axis_angle();
        Quat::from_axis_angle(axis, ctx.config.snap_angle(angle))
    }

    pub fn compute_delta(&mut self, sample: &InputSample, ctx: &ToolContext) -> Delta {
        let origin = ctx.origin.handle_rotation;
        let current = sample.handle_rotation;

        match self.about {
            RotationPivot::GroupBasis => {
                let delta = Self::snap((origin.inverse() * current).normalize(), ctx);
                Delta::rotation(delta)
            }
            RotationPivot::Handle => {
                let delta = Self::snap((current * origin.inverse()).normalize(), ctx);
                Delta::rotation(delta).in_frame(DeltaFrame::PivotOnly)
            }
        }
    }
}
