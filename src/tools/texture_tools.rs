//! UV tools
//!
//! Same shapes as the position tools, applied to `(u, v, 0)` values. The
//! handle's on-screen up is texture down, so the v offset is negated, and
//! offsets are divided by the mesh scale so a world unit of handle travel is
//! one texture unit on an unscaled mesh.

use crate::apply::Delta;
use crate::math::{twist_about_z, Quat, Vec3};
use crate::session::InputSample;

use super::{safe_ratio, ToolContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextureTranslateTool;

impl TextureTranslateTool {
    /// UV offset for a sample (before snapping)
    pub fn uv_offset(sample: &InputSample, ctx: &ToolContext) -> Vec3 {
        let travel = sample.handle_position - ctx.origin.handle_position;
        let mut offset = ctx.origin.handle_rotation.inverse() * travel;
        offset.y = -offset.y;
        offset.z = 0.0;
        safe_ratio(offset, ctx.mesh_scale)
    }

    pub fn compute_delta(&mut self, sample: &InputSample, ctx: &ToolContext) -> Delta {
        let offset = Self::uv_offset(sample, ctx);
        let snapped = Vec3::new(ctx.config.snap(offset.x), ctx.config.snap(offset.y), 0.0);
        Delta::translation(snapped)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextureRotateTool;

impl TextureRotateTool {
    pub fn compute_delta(&mut self, sample: &InputSample, ctx: &ToolContext) -> Delta {
        let delta = ctx.origin.handle_rotation.inverse() * sample.handle_rotation;
        let angle = ctx.config.snap_angle(-twist_about_z(delta));
        Delta::rotation(Quat::from_rotation_z(angle))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextureScaleTool;

impl TextureScaleTool {
    pub fn compute_delta(&mut self, sample: &InputSample, ctx: &ToolContext) -> Delta {
        let ratio = safe_ratio(sample.handle_scale, ctx.origin.handle_scale);
        Delta::scale(Vec3::new(ratio.x, ratio.y, 1.0))
    }
}
