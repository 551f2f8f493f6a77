//! Vector math helpers for handle transforms
//!
//! glam provides the vector, quaternion and matrix types. This module adds the
//! handful of editor-specific operations the transform pipeline needs:
//! - `Aabb` - axis-aligned bounds for pivot computation
//! - `AxisMask` - which axes a drag is moving along
//! - grid snapping of scalars and vectors
//! - cardinal-axis tests, point-on-line projection, look-rotation bases

pub use glam::{Mat4, Quat, Vec2, Vec3};

/// Drag components below this magnitude count as "not moving" on that axis.
pub const CARDINAL_AXIS_EPSILON: f32 = 0.001;

/// Tolerance used when deciding a normal or axis is degenerate.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

// =============================================================================
// Bounds
// =============================================================================

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of a single point (zero size)
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Bounds of a set of points, `None` when the iterator is empty
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Aabb::from_point(first);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Average of a set of points, `None` when empty
pub fn average(points: impl IntoIterator<Item = Vec3>) -> Option<Vec3> {
    let mut sum = Vec3::ZERO;
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f32)
    }
}

// =============================================================================
// Axis masks
// =============================================================================

/// Set of active axes (x, y, z)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisMask {
    pub const NONE: AxisMask = AxisMask { x: false, y: false, z: false };

    /// Axes whose component magnitude exceeds `epsilon`
    pub fn from_vec3(v: Vec3, epsilon: f32) -> Self {
        Self {
            x: v.x.abs() > epsilon,
            y: v.y.abs() > epsilon,
            z: v.z.abs() > epsilon,
        }
    }

    /// Number of active axes
    pub fn active(&self) -> usize {
        self.x as usize + self.y as usize + self.z as usize
    }

    pub fn union(self, other: AxisMask) -> AxisMask {
        AxisMask {
            x: self.x || other.x,
            y: self.y || other.y,
            z: self.z || other.z,
        }
    }

    /// 1.0 on active axes, 0.0 elsewhere
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(
            if self.x { 1.0 } else { 0.0 },
            if self.y { 1.0 } else { 0.0 },
            if self.z { 1.0 } else { 0.0 },
        )
    }
}

// =============================================================================
// Snapping
// =============================================================================

/// Round `value` to the nearest multiple of `snap`. A non-positive snap leaves
/// the value untouched.
pub fn snap_value(value: f32, snap: f32) -> f32 {
    if snap <= 0.0 || !snap.is_finite() {
        return value;
    }
    (value / snap).round() * snap
}

/// Per-axis snap; axes with a zero increment are left as-is
pub fn snap_vec3(v: Vec3, increments: Vec3) -> Vec3 {
    Vec3::new(
        snap_value(v.x, increments.x),
        snap_value(v.y, increments.y),
        snap_value(v.z, increments.z),
    )
}

/// Whether `v` points along the world X, Y or Z axis (either sign)
pub fn is_cardinal_axis(v: Vec3, epsilon: f32) -> bool {
    let n = v.normalize_or_zero();
    if n == Vec3::ZERO {
        return false;
    }
    (1.0 - n.dot(Vec3::Y).abs()) < epsilon
        || (1.0 - n.dot(Vec3::Z).abs()) < epsilon
        || (1.0 - n.dot(Vec3::X).abs()) < epsilon
}

/// Closest point to `p` on the infinite line through `a` and `b`
pub fn project_point_line(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let dir = b - a;
    let len_sq = dir.length_squared();
    if len_sq < DEGENERATE_EPSILON {
        return a;
    }
    a + dir * ((p - a).dot(dir) / len_sq)
}

// =============================================================================
// Rotations
// =============================================================================

/// Rotation whose local +Z points along `forward` and whose +Y is as close to
/// `up` as possible. Returns `None` if `forward` is zero-length.
///
/// When `up` is parallel to `forward` the world X axis is used as the up hint
/// instead, so the result is always deterministic.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let z = forward.normalize_or_zero();
    if z == Vec3::ZERO {
        return None;
    }

    let mut x = up.cross(z);
    if x.length_squared() < DEGENERATE_EPSILON {
        x = Vec3::X.cross(z);
        if x.length_squared() < DEGENERATE_EPSILON {
            x = Vec3::Y.cross(z);
        }
    }
    let x = x.normalize();
    let y = z.cross(x);

    Some(Quat::from_mat3(&glam::Mat3::from_cols(x, y, z)).normalize())
}

/// Signed rotation angle of `q` about its Z axis (radians, -PI..PI)
pub fn twist_about_z(q: Quat) -> f32 {
    let angle = 2.0 * q.z.atan2(q.w);
    wrap_angle(angle)
}

/// Wrap an angle into -PI..PI
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

/// Rotation part of an affine matrix with scale removed
pub fn matrix_rotation(m: &Mat4) -> Quat {
    let (_, rotation, _) = m.to_scale_rotation_translation();
    rotation.normalize()
}

/// Absolute scale of an affine matrix (Unity's "lossy scale")
pub fn matrix_lossy_scale(m: &Mat4) -> Vec3 {
    let (scale, _, _) = m.to_scale_rotation_translation();
    scale.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_center() {
        let bounds = Aabb::from_points([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        let c = bounds.center();
        assert!((c.x - 0.5).abs() < 0.0001);
        assert!((c.y - 0.5).abs() < 0.0001);
        assert!(c.z.abs() < 0.0001);
        assert!((bounds.size() - Vec3::new(1.0, 1.0, 0.0)).length() < 0.0001);
    }

    #[test]
    fn test_aabb_empty() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_snap_value() {
        assert!((snap_value(0.3, 0.25) - 0.25).abs() < 0.0001);
        assert!((snap_value(0.4, 0.25) - 0.5).abs() < 0.0001);
        assert!((snap_value(0.4, 0.0) - 0.4).abs() < 0.0001);
    }

    #[test]
    fn test_axis_mask() {
        let mask = AxisMask::from_vec3(Vec3::new(2.0, 0.0005, -1.0), CARDINAL_AXIS_EPSILON);
        assert_eq!(mask, AxisMask { x: true, y: false, z: true });
        assert_eq!(mask.active(), 2);
    }

    #[test]
    fn test_cardinal_axis() {
        assert!(is_cardinal_axis(Vec3::new(0.0, -3.0, 0.0), 0.0001));
        assert!(!is_cardinal_axis(Vec3::new(1.0, 1.0, 0.0), 0.0001));
        assert!(!is_cardinal_axis(Vec3::ZERO, 0.0001));
    }

    #[test]
    fn test_project_point_line() {
        let p = project_point_line(Vec3::new(3.0, 5.0, 0.0), Vec3::ZERO, Vec3::X);
        assert!((p - Vec3::new(3.0, 0.0, 0.0)).length() < 0.0001);
    }

    #[test]
    fn test_look_rotation_forward() {
        let q = look_rotation(Vec3::Y, Vec3::Y).unwrap();
        let z = q * Vec3::Z;
        assert!((z - Vec3::Y).length() < 0.0001, "z={:?}", z);
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_twist_about_z() {
        let q = Quat::from_rotation_z(0.5);
        assert!((twist_about_z(q) - 0.5).abs() < 0.0001);
    }
}
