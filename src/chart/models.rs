use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the historical Hot 100 dataset, as stored on disk.
///
/// Only the first four columns are required; the bookkeeping columns are
/// frequently `NA` or blank for debut weeks and are read leniently.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartRow {
    pub chart_position: u32,
    pub chart_date: NaiveDate,
    pub song: String,
    pub performer: String,
    #[serde(default)]
    pub song_id: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub instance: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub time_on_chart: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub consecutive_weeks: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub previous_week: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub peak_position: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub worst_position: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub chart_debut: Option<NaiveDate>,
    #[serde(default)]
    pub chart_url: String,
}

/// A ranked entry of a single chart week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub position: u32,
    pub song: String,
    pub performer: String,
    pub week: NaiveDate,
}

impl From<&ChartRow> for ChartEntry {
    fn from(row: &ChartRow) -> Self {
        Self {
            position: row.chart_position,
            song: row.song.clone(),
            performer: row.performer.clone(),
            week: row.chart_date,
        }
    }
}
