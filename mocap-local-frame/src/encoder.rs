/// Output record encoding
use crate::frame::MarkerFrame;
use crate::transform::{Direction, TransformedFrame};
use constants::marker::{LOCAL_RECORD_FIELD_COUNT, MARKER_COUNT, WORLD_RECORD_FIELD_COUNT};

/// Column names for the records produced in `direction`.
pub fn header_fields(direction: Direction) -> Vec<String> {
    let mut fields: Vec<String> = (0..MARKER_COUNT)
        .flat_map(|i| ["x", "y", "z"].map(|axis| format!("m{i}_{axis}")))
        .collect();
    if direction == Direction::WorldToLocal {
        fields.extend(["tx", "ty", "tz", "qx", "qy", "qz", "qw"].map(String::from));
    }
    fields
}

/// Number of fields in every record produced in `direction`.
pub fn output_field_count(direction: Direction) -> usize {
    match direction {
        Direction::WorldToLocal => LOCAL_RECORD_FIELD_COUNT,
        Direction::LocalToWorld => WORLD_RECORD_FIELD_COUNT,
    }
}

/// Render a transformed frame as output fields.
/// Local frames carry their local-to-world translation and rotation (x, y, z, w) after the markers.
pub fn encode(frame: &TransformedFrame) -> Vec<String> {
    match frame {
        TransformedFrame::Local(local) => {
            let mut fields = Vec::with_capacity(LOCAL_RECORD_FIELD_COUNT);
            push_markers(&mut fields, &local.markers);
            fields.extend(local.to_world.translation.to_array().map(format_value));
            fields.extend(local.to_world.rotation.to_array().map(format_value));
            fields
        }
        TransformedFrame::World(markers) => {
            let mut fields = Vec::with_capacity(WORLD_RECORD_FIELD_COUNT);
            push_markers(&mut fields, markers);
            fields
        }
    }
}

/// Record of empty fields standing in for an undecodable input row.
pub fn blank_record(direction: Direction) -> Vec<String> {
    vec![String::new(); output_field_count(direction)]
}

/// Shortest decimal text that parses back to `value`; missing and non-finite values are empty.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        String::new()
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn push_markers(fields: &mut Vec<String>, markers: &MarkerFrame) {
    for position in markers.positions() {
        fields.extend(position.to_array().map(format_value));
    }
}
