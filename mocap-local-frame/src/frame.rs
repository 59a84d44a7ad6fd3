/// Marker frames and the rigid transforms that relate body-local to world coordinates.
use bevy_math::{DQuat, DVec3};
use constants::marker::MARKER_COUNT;

/// One time sample of marker positions. Missing components are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerFrame {
    positions: [DVec3; MARKER_COUNT],
}

impl MarkerFrame {
    pub fn new(positions: [DVec3; MARKER_COUNT]) -> Self {
        Self { positions }
    }

    /// Frame with every marker missing.
    pub fn missing() -> Self {
        Self::new([DVec3::NAN; MARKER_COUNT])
    }

    pub fn positions(&self) -> &[DVec3; MARKER_COUNT] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> DVec3 {
        self.positions[index]
    }

    /// Apply `f` to every marker position, keeping marker order.
    pub fn map(&self, f: impl Fn(DVec3) -> DVec3) -> Self {
        Self::new(self.positions.map(f))
    }

    /// Markers with at least one missing component.
    pub fn missing_count(&self) -> usize {
        self.positions.iter().filter(|p| !p.is_finite()).count()
    }
}

/// Mapping from a body-local frame back to the world frame:
/// `world = rotation * local + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl RigidTransform {
    /// Transform whose parameters could not be determined.
    pub const MISSING: Self = Self {
        translation: DVec3::NAN,
        rotation: DQuat::NAN,
    };

    pub fn new(translation: DVec3, rotation: DQuat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite()
    }

    /// Map a local position to world coordinates.
    pub fn apply(&self, local: DVec3) -> DVec3 {
        self.rotation * local + self.translation
    }
}

/// Normalise decoded quaternion coefficients, or mark the rotation missing when
/// they have no direction.
pub fn unit_rotation(x: f64, y: f64, z: f64, w: f64) -> DQuat {
    let raw = DQuat::from_xyzw(x, y, z, w);
    let length_squared = raw.length_squared();
    if raw.is_finite() && length_squared > 0.0 {
        raw / length_squared.sqrt()
    } else {
        DQuat::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn counts_partially_missing_markers_as_missing() {
        let mut positions = [DVec3::ONE; MARKER_COUNT];
        positions[4] = DVec3::new(1.0, f64::NAN, 2.0);
        positions[7] = DVec3::NAN;

        assert_eq!(MarkerFrame::new(positions).missing_count(), 2);
        assert_eq!(MarkerFrame::missing().missing_count(), MARKER_COUNT);
    }

    #[test]
    fn applies_rotation_before_translation() {
        let transform = RigidTransform::new(
            DVec3::new(10.0, 0.0, 0.0),
            DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
        );
        let world = transform.apply(DVec3::X);

        assert_abs_diff_eq!(world.x, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(world.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(world.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn normalises_scaled_quaternions() {
        let q = unit_rotation(0.0, 0.0, 0.0, 2.0);
        assert_eq!(q, DQuat::IDENTITY);
    }

    #[test]
    fn zero_or_missing_quaternions_become_missing() {
        assert!(!unit_rotation(0.0, 0.0, 0.0, 0.0).is_finite());
        assert!(!unit_rotation(f64::NAN, 0.0, 0.0, 1.0).is_finite());
    }
}
