/// Marker index configuration loaded from an INI file.
use crate::error::ConfigError;
use constants::index_config::{INDEX_SECTION, LEFT_PELVIS_KEY, RIGHT_PELVIS_KEY, SACRAL_KEY};
use constants::marker::MARKER_COUNT;
use ini::{Ini, Properties};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Indices of the pelvis landmarks inside each marker frame.
/// Validated against the marker count when loaded and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerIndexConfig {
    pub left_pelvis: usize,
    pub right_pelvis: usize,
    pub sacral: usize,
}

impl MarkerIndexConfig {
    /// Build a config from raw indices, rejecting any index outside the marker table.
    pub fn new(left_pelvis: usize, right_pelvis: usize, sacral: usize) -> Result<Self, ConfigError> {
        for (key, index) in [
            (LEFT_PELVIS_KEY, left_pelvis),
            (RIGHT_PELVIS_KEY, right_pelvis),
            (SACRAL_KEY, sacral),
        ] {
            if index >= MARKER_COUNT {
                return Err(ConfigError::IndexOutOfRange {
                    key,
                    index,
                    marker_count: MARKER_COUNT,
                });
            }
        }

        Ok(Self {
            left_pelvis,
            right_pelvis,
            sacral,
        })
    }

    /// Load indices from the `[Indexies]` section of an INI file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let ini = Ini::load_from_str(&text).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let section = ini
            .section(Some(INDEX_SECTION))
            .ok_or(ConfigError::MissingSection {
                section: INDEX_SECTION,
            })?;

        Self::new(
            read_index(section, LEFT_PELVIS_KEY)?,
            read_index(section, RIGHT_PELVIS_KEY)?,
            read_index(section, SACRAL_KEY)?,
        )
    }
}

fn read_index(section: &Properties, key: &'static str) -> Result<usize, ConfigError> {
    let value = section.get(key).ok_or(ConfigError::MissingKey {
        section: INDEX_SECTION,
        key,
    })?;

    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidIndex {
            key,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(text: &str) -> Result<MarkerIndexConfig, ConfigError> {
        let ini = Ini::load_from_str(text).expect("test INI parses");
        MarkerIndexConfig::from_ini(&ini)
    }

    #[test]
    fn reads_all_three_indices() {
        let config = parse("[Indexies]\nLeftAsis=9\nRightAsis = 10\nVSacral=11\n").unwrap();
        assert_eq!(config, MarkerIndexConfig::new(9, 10, 11).unwrap());
    }

    #[test]
    fn reports_missing_section() {
        let err = parse("[Markers]\nLeftAsis=0\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { section: "Indexies" }));
    }

    #[test]
    fn reports_the_first_missing_key() {
        let err = parse("[Indexies]\nLeftAsis=0\nVSacral=2\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "RightAsis", .. }));
    }

    #[test]
    fn rejects_non_numeric_and_negative_indices() {
        let err = parse("[Indexies]\nLeftAsis=left\nRightAsis=1\nVSacral=2\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIndex { key: "LeftAsis", .. }));

        let err = parse("[Indexies]\nLeftAsis=0\nRightAsis=-1\nVSacral=2\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIndex { key: "RightAsis", .. }));
    }

    #[test]
    fn rejects_indices_past_the_marker_table() {
        let err = parse("[Indexies]\nLeftAsis=0\nRightAsis=1\nVSacral=29\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::IndexOutOfRange {
                key: "VSacral",
                index: 29,
                marker_count: 29
            }
        ));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[Indexies]\nLeftAsis=0\nRightAsis=1\nVSacral=2").unwrap();

        let config = MarkerIndexConfig::load(file.path()).unwrap();
        assert_eq!(config.sacral, 2);
    }

    #[test]
    fn distinguishes_unreadable_from_malformed_files() {
        let err = MarkerIndexConfig::load(Path::new("/nonexistent/indices.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[Indexies\nLeftAsis=0").unwrap();
        let err = MarkerIndexConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }
}
