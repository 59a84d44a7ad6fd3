/// Record decoding into marker frames and transform parameters
use crate::error::DecodeError;
use crate::frame::{MarkerFrame, RigidTransform, unit_rotation};
use crate::transform::Direction;
use bevy_math::DVec3;
use constants::marker::{
    LOCAL_RECORD_FIELD_COUNT, MARKER_COUNT, MARKER_FIELD_COUNT, POSITION_COMPONENTS,
    TRANSLATION_FIELD_COUNT, WORLD_RECORD_FIELD_COUNT,
};

/// A record decoded for one conversion direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedFrame {
    World(MarkerFrame),
    Local {
        markers: MarkerFrame,
        to_world: RigidTransform,
    },
}

/// Decodes delimited numeric records for a fixed conversion direction.
#[derive(Debug, Clone, Copy)]
pub struct FrameDecoder {
    direction: Direction,
}

impl FrameDecoder {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    /// Number of leading fields a record must carry.
    pub fn required_fields(&self) -> usize {
        match self.direction {
            Direction::WorldToLocal => WORLD_RECORD_FIELD_COUNT,
            Direction::LocalToWorld => LOCAL_RECORD_FIELD_COUNT,
        }
    }

    /// Decode the leading fields of a record. Fields past the required count are ignored.
    pub fn decode<I>(&self, fields: I) -> Result<DecodedFrame, DecodeError>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let expected = self.required_fields();
        let values: Vec<f64> = fields
            .into_iter()
            .take(expected)
            .map(|field| decode_field(field.as_ref()))
            .collect();
        if values.len() < expected {
            return Err(DecodeError::ShortRecord {
                expected,
                found: values.len(),
            });
        }

        let markers = markers_from_values(&values[..MARKER_FIELD_COUNT]);
        Ok(match self.direction {
            Direction::WorldToLocal => DecodedFrame::World(markers),
            Direction::LocalToWorld => {
                let (t, q) = values[MARKER_FIELD_COUNT..].split_at(TRANSLATION_FIELD_COUNT);
                DecodedFrame::Local {
                    markers,
                    to_world: RigidTransform::new(
                        DVec3::new(t[0], t[1], t[2]),
                        unit_rotation(q[0], q[1], q[2], q[3]),
                    ),
                }
            }
        })
    }
}

/// Decode one raw field. Bytes that are not UTF-8 are a missing value like any other bad token.
pub fn decode_field(bytes: &[u8]) -> f64 {
    std::str::from_utf8(bytes).map_or(f64::NAN, parse_field)
}

/// Parse one numeric field. Empty, unparsable and non-finite text is a missing value.
pub fn parse_field(field: &str) -> f64 {
    match field.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => f64::NAN,
    }
}

fn markers_from_values(values: &[f64]) -> MarkerFrame {
    let mut positions = [DVec3::NAN; MARKER_COUNT];
    for (position, xyz) in positions
        .iter_mut()
        .zip(values.chunks_exact(POSITION_COMPONENTS))
    {
        *position = DVec3::new(xyz[0], xyz[1], xyz[2]);
    }
    MarkerFrame::new(positions)
}
