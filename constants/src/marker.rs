/// Number of markers carried by every record
pub const MARKER_COUNT: usize = 29;

/// Components per marker position (x, y, z)
pub const POSITION_COMPONENTS: usize = 3;

/// Numeric fields holding marker positions
pub const MARKER_FIELD_COUNT: usize = MARKER_COUNT * POSITION_COMPONENTS;

/// Translation components of a local-to-world transform
pub const TRANSLATION_FIELD_COUNT: usize = 3;

/// Quaternion coefficients of a local-to-world transform, ordered x, y, z, w
pub const ROTATION_FIELD_COUNT: usize = 4;

/// Fields of a local-frame record: markers, then translation, then rotation
pub const LOCAL_RECORD_FIELD_COUNT: usize =
    MARKER_FIELD_COUNT + TRANSLATION_FIELD_COUNT + ROTATION_FIELD_COUNT;

/// Fields of a world-frame record
pub const WORLD_RECORD_FIELD_COUNT: usize = MARKER_FIELD_COUNT;
