use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named numeric audio attributes (danceability, energy, tempo, ...).
pub type AudioFeatures = BTreeMap<String, f64>;

/// A track as returned by a catalog search, reduced to what the pipeline keeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub explicit: Option<bool>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub track_url: Option<String>,
}

impl CatalogTrack {
    /// Year part of the album release date ("2019", "2019-11" and "2019-11-29" all give 2019).
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()?
            .split('-')
            .next()?
            .trim()
            .parse()
            .ok()
    }
}
