//! Saved pollution scores.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::state::PollutionScores;
use crate::core::SimError;

/// Default save location, relative to the working directory.
pub const SAVE_PATH: &str = "saves/pollution.ron";

/// Where the current session reads and writes its pollution record.
#[derive(Resource, Debug, Clone)]
pub struct SavePath(pub PathBuf);

impl Default for SavePath {
    fn default() -> Self {
        Self(PathBuf::from(SAVE_PATH))
    }
}

/// The persisted four-integer pollution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PollutionRecord {
    pub carbon: u8,
    pub trash: u8,
    pub fishing: u8,
    pub sewage: u8,
}

impl From<PollutionScores> for PollutionRecord {
    fn from(scores: PollutionScores) -> Self {
        Self {
            carbon: scores.carbon,
            trash: scores.trash,
            fishing: scores.fishing,
            sewage: scores.sewage,
        }
    }
}

impl From<PollutionRecord> for PollutionScores {
    fn from(record: PollutionRecord) -> Self {
        PollutionScores::new(record.carbon, record.trash, record.fishing, record.sewage)
    }
}

/// Read a record. A missing file is not an error: it means a fresh session.
pub fn load_record(path: &Path) -> Result<Option<PollutionRecord>, SimError> {
    if !path.exists() {
        return Ok(None);
    }

    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|e| SimError::ReadError {
        path: display.clone(),
        details: e.to_string(),
    })?;

    ron::from_str(&contents)
        .map(Some)
        .map_err(|e| SimError::ParseError {
            path: display,
            details: e.to_string(),
        })
}

/// Write a record, creating parent directories as needed.
pub fn save_record(path: &Path, record: &PollutionRecord) -> Result<(), SimError> {
    let display = path.display().to_string();
    let write_error = |e: std::io::Error| SimError::WriteError {
        path: display.clone(),
        details: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let contents = ron::ser::to_string_pretty(record, ron::ser::PrettyConfig::default())
        .map_err(|e| SimError::ParseError {
            path: display.clone(),
            details: e.to_string(),
        })?;

    fs::write(path, contents).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tidewater-{}-{}", name, std::process::id()))
            .join("pollution.ron")
    }

    #[test]
    fn test_missing_file_is_fresh_session() {
        let path = temp_path("missing");
        assert_eq!(load_record(&path).unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("save");
        let record = PollutionRecord {
            carbon: 3,
            trash: 7,
            fishing: 10,
            sewage: 0,
        };
        save_record(&path, &record).unwrap();
        assert_eq!(load_record(&path).unwrap(), Some(record));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(carbon: \"lots\")").unwrap();
        assert!(matches!(load_record(&path), Err(SimError::ParseError { .. })));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_out_of_range_record_is_clamped_into_scores() {
        let record = PollutionRecord {
            carbon: 40,
            trash: 2,
            fishing: 11,
            sewage: 10,
        };
        let scores = PollutionScores::from(record);
        assert_eq!(scores, PollutionScores::new(10, 2, 10, 10));
    }
}
