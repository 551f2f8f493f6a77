//! Scale Tool
//!
//! Scales positions about each group's pivot along the group's own axes.
//! Zero factors are passed through; they collapse geometry onto the pivot.

use crate::apply::Delta;
use crate::session::InputSample;

use super::{safe_ratio, ToolContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleTool;

impl ScaleTool {
    pub fn compute_delta(&mut self, sample: &InputSample, ctx: &ToolContext) -> Delta {
        Delta::scale(safe_ratio(sample.handle_scale, ctx.origin.handle_scale))
    }
}
