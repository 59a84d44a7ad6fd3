use bevy_math::DVec3;

/// Up axis of both world and body-local frames (Z-up lab convention)
pub const VERTICAL_AXIS: DVec3 = DVec3::Z;

/// Canonical body-local forward axis: X forward, Y left, Z up
pub const FORWARD_AXIS: DVec3 = DVec3::X;

/// Ground-projected heading vectors shorter than this have no usable direction
pub const HEADING_EPSILON: f64 = 1e-9;

/// Headings whose dot product with the forward axis is below `-1 + ANTIPARALLEL_EPSILON`
/// are rotated by a half turn about the vertical axis
pub const ANTIPARALLEL_EPSILON: f64 = 1e-12;

/// Project a vector onto the ground plane by dropping its vertical component.
/// The vertical component is discarded, not scaled, so a missing height does not
/// leak into the horizontal result.
pub fn project_to_ground(v: DVec3) -> DVec3 {
    DVec3::new(v.x, v.y, 0.0)
}
