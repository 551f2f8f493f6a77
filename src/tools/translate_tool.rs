//! Translate Tool
//!
//! Moves positions by the handle's travel, expressed in the handle's starting
//! frame so the offset lands along each group's basis.
//!
//! Two optional snaps:
//! - vertex snap: a drag along exactly one handle axis is pulled onto the
//!   projection of the target vertex onto that axis
//! - grid snap: per-axis in world space once the drag has gone cardinal in
//!   world space (or off-axis in handle space), otherwise along the travel
//!   distance

use crate::apply::Delta;
use crate::math::{is_cardinal_axis, project_point_line, snap_value, snap_vec3, AxisMask, Vec3, CARDINAL_AXIS_EPSILON};
use crate::session::InputSample;

use super::ToolContext;

#[derive(Debug, Clone, Default)]
pub struct TranslateTool {
    /// Latched once a drag qualifies for world-axis snapping
    snap_in_world: bool,
    /// World axes the drag has moved along so far
    world_mask: AxisMask,
}

impl TranslateTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.snap_in_world = false;
        self.world_mask = AxisMask::NONE;
    }

    pub fn snaps_in_world(&self) -> bool {
        self.snap_in_world
    }

    /// Handle position after vertex or grid snapping
    pub fn snapped_position(&mut self, sample: &InputSample, ctx: &ToolContext) -> Vec3 {
        let origin = ctx.origin.handle_position;
        let origin_rotation = ctx.origin.handle_rotation;
        let travel = sample.handle_position - origin;

        if travel.length_squared() < crate::math::DEGENERATE_EPSILON * crate::math::DEGENERATE_EPSILON {
            return sample.handle_position;
        }

        let local_dir = origin_rotation.inverse() * travel;

        if ctx.config.vertex_snap {
            if let Some(target) = sample.snap_target {
                let mask = AxisMask::from_vec3(local_dir, CARDINAL_AXIS_EPSILON);
                if mask.active() == 1 {
                    let axis = origin_rotation * mask.to_vec3();
                    return project_point_line(target, origin, origin + axis);
                }
            }
            return sample.handle_position;
        }

        if !ctx.config.snap_enabled {
            return sample.handle_position;
        }

        if !self.snap_in_world
            && (is_cardinal_axis(travel, CARDINAL_AXIS_EPSILON)
                || !is_cardinal_axis(local_dir, CARDINAL_AXIS_EPSILON))
        {
            self.snap_in_world = true;
        }

        if self.snap_in_world {
            self.world_mask = self.world_mask.union(AxisMask::from_vec3(travel, CARDINAL_AXIS_EPSILON));
            let increments = self.world_mask.to_vec3() * ctx.config.snap_value;
            snap_vec3(sample.handle_position, increments)
        } else {
            let distance = snap_value(travel.length(), ctx.config.snap_value);
            origin + travel.normalize_or_zero() * distance
        }
    }

    pub fn compute_delta(&mut self, sample: &InputSample, ctx: &ToolContext) -> Delta {
        let position = self.snapped_position(sample, ctx);
        let offset = position - ctx.origin.handle_position;
        Delta::translation(ctx.origin.handle_rotation.inverse() * offset)
    }
}
