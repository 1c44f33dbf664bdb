//! The enriched snapshot of one chart week, persisted as pretty JSON.
//!
//! The snapshot lets the asset stage run without querying the catalog again.

use crate::catalog::{AudioFeatures, CatalogTrack};
use crate::chart::ChartEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot IO error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A chart entry with whatever the catalog could tell about it.
///
/// All catalog fields absent means the lookup missed; that is a normal
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub entry: ChartEntry,
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub album_art_url: Option<String>,
    #[serde(default)]
    pub audio_features: Option<AudioFeatures>,
    #[serde(default)]
    pub track: Option<CatalogTrack>,
}

impl EnrichedEntry {
    pub fn unmatched(entry: ChartEntry) -> Self {
        Self {
            entry,
            track_id: None,
            album_art_url: None,
            audio_features: None,
            track: None,
        }
    }

    pub fn matched(
        entry: ChartEntry,
        track: CatalogTrack,
        audio_features: Option<AudioFeatures>,
    ) -> Self {
        Self {
            entry,
            track_id: Some(track.id.clone()),
            album_art_url: track.image_url.clone(),
            audio_features,
            track: Some(track),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.track_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub week: NaiveDate,
    pub entries: Vec<EnrichedEntry>,
}

/// `billboard_<YYYY-MM-DD>.json`
pub fn snapshot_file_name(week: NaiveDate) -> String {
    format!("billboard_{}.json", week.format("%Y-%m-%d"))
}

impl Snapshot {
    pub fn new(week: NaiveDate, entries: Vec<EnrichedEntry>) -> Self {
        Self { week, entries }
    }

    /// Writes the snapshot into `dir`, replacing an earlier one for the same week.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(dir).map_err(|source| SnapshotError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(snapshot_file_name(self.week));
        let body = serde_json::to_string_pretty(self)?;
        fs::write(&path, body).map_err(|source| SnapshotError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let body = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn matched_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_matched()).count()
    }
}
