/// Pelvis-anchored frame derivation and world/local marker transforms.
///
/// The body-local frame has its origin at the midpoint of the two pelvis
/// landmarks and is rotated about the vertical axis only, so that the
/// ground-projected direction from the sacral landmark to the pelvis center
/// lies on [`FORWARD_AXIS`]. Forward lean and sideways tilt of the pelvis are
/// left in the local coordinates.
use crate::config::MarkerIndexConfig;
use crate::decoder::DecodedFrame;
use crate::frame::{MarkerFrame, RigidTransform};
use bevy_math::{DQuat, DVec3};
use constants::coordinate_system::{
    ANTIPARALLEL_EPSILON, FORWARD_AXIS, HEADING_EPSILON, VERTICAL_AXIS, project_to_ground,
};
use serde::Serialize;
use std::f64::consts::PI;

/// Conversion direction, fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    WorldToLocal,
    LocalToWorld,
}

/// How the heading of a world frame was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    /// Rotation derived from the sacral landmark.
    Resolved,
    /// Sacral landmark sits over the pelvis center; identity rotation used.
    Degenerate,
    /// Sacral landmark has no horizontal position; identity rotation used.
    SacralMissing,
    /// Pelvis center unknown; every output value is missing.
    PelvisMissing,
}

/// World frame re-expressed in the body-local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub markers: MarkerFrame,
    pub to_world: RigidTransform,
    pub heading: Heading,
}

/// Result of transforming one decoded record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformedFrame {
    Local(LocalFrame),
    World(MarkerFrame),
}

/// Stateless per-record transformer bound to one set of pelvis landmark indices.
#[derive(Debug, Clone, Copy)]
pub struct FrameTransformer {
    indices: MarkerIndexConfig,
}

impl FrameTransformer {
    pub fn new(indices: MarkerIndexConfig) -> Self {
        Self { indices }
    }

    pub fn transform(&self, frame: &DecodedFrame) -> TransformedFrame {
        match frame {
            DecodedFrame::World(markers) => TransformedFrame::Local(self.world_to_local(markers)),
            DecodedFrame::Local { markers, to_world } => {
                TransformedFrame::World(local_to_world(markers, to_world))
            }
        }
    }

    /// Translate markers to the pelvis center and rotate the heading onto the forward axis.
    pub fn world_to_local(&self, world: &MarkerFrame) -> LocalFrame {
        let left = world.position(self.indices.left_pelvis);
        let right = world.position(self.indices.right_pelvis);
        let center = (left + right) * 0.5;

        if !center.is_finite() {
            return LocalFrame {
                markers: MarkerFrame::missing(),
                to_world: RigidTransform::MISSING,
                heading: Heading::PelvisMissing,
            };
        }

        let sacral = world.position(self.indices.sacral);
        let forward = project_to_ground(center - sacral);
        let (to_local, heading) = heading_rotation(forward);

        LocalFrame {
            markers: world.map(|p| to_local * (p - center)),
            to_world: RigidTransform::new(center, to_local.inverse()),
            heading,
        }
    }
}

/// Map local markers back to world coordinates.
pub fn local_to_world(local: &MarkerFrame, to_world: &RigidTransform) -> MarkerFrame {
    if !to_world.is_finite() {
        return MarkerFrame::missing();
    }
    local.map(|p| to_world.apply(p))
}

/// Shortest-arc rotation taking a ground-plane heading onto the forward axis.
fn heading_rotation(forward: DVec3) -> (DQuat, Heading) {
    if !forward.is_finite() {
        return (DQuat::IDENTITY, Heading::SacralMissing);
    }

    let length = forward.length();
    if length < HEADING_EPSILON {
        return (DQuat::IDENTITY, Heading::Degenerate);
    }

    let heading = forward / length;
    let rotation = if heading.dot(FORWARD_AXIS) < -1.0 + ANTIPARALLEL_EPSILON {
        DQuat::from_axis_angle(VERTICAL_AXIS, PI)
    } else {
        DQuat::from_rotation_arc(heading, FORWARD_AXIS)
    };

    (rotation, Heading::Resolved)
}
