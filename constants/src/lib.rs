/// Shared constants for marker frame conversion
pub mod coordinate_system;
pub mod index_config;
pub mod marker;
