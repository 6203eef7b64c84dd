/// Snapshot persistence for collected archives.
///
/// Collecting a season of worksheets and ASOS archives is the slow part of
/// a verification run. A snapshot serializes the loaded forecast and
/// observation archives to JSON so later runs can skip collection and go
/// straight to scoring. Reloading a snapshot reproduces the archives
/// exactly.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forecasts::ForecastArchive;
use crate::observations::ObservationArchive;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Verification window the archives were collected for.
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub forecasts: ForecastArchive,
    pub observations: ObservationArchive,
}

#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(err) => write!(f, "snapshot i/o error: {}", err),
            SnapshotError::Json(err) => write!(f, "snapshot encoding error: {}", err),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> SnapshotError {
        SnapshotError::Io(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> SnapshotError {
        SnapshotError::Json(err)
    }
}

impl Snapshot {
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Snapshot, SnapshotError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
