//! Handle tools
//!
//! A tool turns a raw handle sample into a `Delta` for the applier. Every tool
//! works from the handle's pose at edit begin (the origin), never from the
//! previous tick.
//!
//! Key types:
//! - `ActiveTool`: Enum of all tools
//! - Position tools: TranslateTool, RotateTool, ScaleTool
//! - UV tools: TextureTranslateTool, TextureRotateTool, TextureScaleTool

mod rotate_tool;
mod scale_tool;
mod texture_tools;
mod translate_tool;

pub use rotate_tool::{RotateTool, RotationPivot};
pub use scale_tool::ScaleTool;
pub use texture_tools::{TextureRotateTool, TextureScaleTool, TextureTranslateTool};
pub use translate_tool::TranslateTool;

use crate::apply::Delta;
use crate::config::TransformConfig;
use crate::math::Vec3;
use crate::mesh::ElementSpace;
use crate::session::InputSample;

/// What a tool sees besides the current sample
#[derive(Debug, Clone, Copy)]
pub struct ToolContext {
    /// Handle pose when the edit began
    pub origin: InputSample,
    pub config: TransformConfig,
    /// Lossy scale of the first selected mesh
    pub mesh_scale: Vec3,
}

/// Divide component-wise, treating a zero divisor as one
pub(crate) fn safe_ratio(value: Vec3, divisor: Vec3) -> Vec3 {
    let pick = |v: f32, d: f32| if d.abs() < crate::math::DEGENERATE_EPSILON { v } else { v / d };
    Vec3::new(
        pick(value.x, divisor.x),
        pick(value.y, divisor.y),
        pick(value.z, divisor.z),
    )
}

/// The tool driving an edit session
#[derive(Debug, Clone)]
pub enum ActiveTool {
    Translate(TranslateTool),
    Rotate(RotateTool),
    Scale(ScaleTool),
    TextureTranslate(TextureTranslateTool),
    TextureRotate(TextureRotateTool),
    TextureScale(TextureScaleTool),
}

impl Default for ActiveTool {
    fn default() -> Self {
        ActiveTool::translate()
    }
}

impl ActiveTool {
    pub fn translate() -> Self {
        ActiveTool::Translate(TranslateTool::new())
    }

    pub fn rotate(about: RotationPivot) -> Self {
        ActiveTool::Rotate(RotateTool::new(about))
    }

    pub fn scale() -> Self {
        ActiveTool::Scale(ScaleTool)
    }

    pub fn texture_translate() -> Self {
        ActiveTool::TextureTranslate(TextureTranslateTool)
    }

    pub fn texture_rotate() -> Self {
        ActiveTool::TextureRotate(TextureRotateTool)
    }

    pub fn texture_scale() -> Self {
        ActiveTool::TextureScale(TextureScaleTool)
    }

    /// Which element array this tool edits
    pub fn element_space(&self) -> ElementSpace {
        match self {
            ActiveTool::Translate(_) | ActiveTool::Rotate(_) | ActiveTool::Scale(_) => {
                ElementSpace::Position
            }
            ActiveTool::TextureTranslate(_)
            | ActiveTool::TextureRotate(_)
            | ActiveTool::TextureScale(_) => ElementSpace::Uv,
        }
    }

    /// Undo label for edits made with this tool
    pub fn label(&self) -> &'static str {
        match self {
            ActiveTool::Translate(_) => "Move Elements",
            ActiveTool::Rotate(_) => "Rotate Elements",
            ActiveTool::Scale(_) => "Scale Elements",
            ActiveTool::TextureTranslate(_) => "Move UVs",
            ActiveTool::TextureRotate(_) => "Rotate UVs",
            ActiveTool::TextureScale(_) => "Scale UVs",
        }
    }

    /// Clear per-edit state; called when an edit begins
    pub fn reset(&mut self) {
        if let ActiveTool::Translate(tool) = self {
            tool.reset();
        }
    }

    pub fn compute_delta(&mut self, sample: &InputSample, ctx: &ToolContext) -> Delta {
        match self {
            ActiveTool::Translate(tool) => tool.compute_delta(sample, ctx),
            ActiveTool::Rotate(tool) => tool.compute_delta(sample, ctx),
            ActiveTool::Scale(tool) => tool.compute_delta(sample, ctx),
            ActiveTool::TextureTranslate(tool) => tool.compute_delta(sample, ctx),
            ActiveTool::TextureRotate(tool) => tool.compute_delta(sample, ctx),
            ActiveTool::TextureScale(tool) => tool.compute_delta(sample, ctx),
        }
    }
}
