//! Reads the historical Hot 100 dataset and selects single chart weeks.

use crate::chart::{ChartEntry, ChartError, ChartRow};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// The full chart history, held in memory.
///
/// The dataset is read once and never written back.
#[derive(Debug, Clone, Default)]
pub struct ChartDataset {
    rows: Vec<ChartRow>,
}

impl ChartDataset {
    /// Opens a CSV dataset with a header row.
    pub fn open(path: &Path) -> Result<Self, ChartError> {
        let reader = csv::Reader::from_path(path)?;
        let dataset = Self::from_csv(reader)?;
        debug!(path = %path.display(), rows = dataset.rows.len(), "dataset.loaded");
        Ok(dataset)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, ChartError> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, ChartError> {
        let mut rows = Vec::new();
        for record in reader.deserialize::<ChartRow>() {
            let row = record?;
            if row.chart_position == 0 {
                warn!(song = %row.song, week = %row.chart_date, "dataset.row.invalid_position");
                continue;
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ChartRow] {
        &self.rows
    }

    /// Returns the entries of one chart week ordered by ascending position.
    ///
    /// A week that is not in the dataset yields an empty vector; deciding
    /// whether that is an error is up to the caller.
    pub fn load(&self, week: NaiveDate) -> Vec<ChartEntry> {
        let mut entries: Vec<ChartEntry> = self
            .rows
            .iter()
            .filter(|row| row.chart_date == week)
            .map(ChartEntry::from)
            .collect();
        entries.sort_by_key(|entry| entry.position);
        entries
    }

    /// Distinct chart dates, newest first.
    pub fn weeks(&self) -> Vec<NaiveDate> {
        let unique: BTreeSet<NaiveDate> = self.rows.iter().map(|row| row.chart_date).collect();
        unique.into_iter().rev().collect()
    }

    pub fn contains_week(&self, week: NaiveDate) -> bool {
        self.rows.iter().any(|row| row.chart_date == week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "chart_position,chart_date,song,performer,song_id,instance,time_on_chart,consecutive_weeks,previous_week,peak_position,worst_position,chart_debut,chart_url\n";

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_csv() -> String {
        let mut body = String::from(HEADER);
        body.push_str("2,2021-01-02,Mood,24kGoldn Featuring iann dior,MoodPerf,1,20,20,1,1,9,2020-08-15,https://www.billboard.com/charts/hot-100/2021-01-02\n");
        body.push_str("1,2021-01-02,Blinding Lights,The Weeknd,BlindingLightsThe Weeknd,1,57,57,2,1,52,2019-12-14,https://www.billboard.com/charts/hot-100/2021-01-02\n");
        body.push_str("3,2021-01-02,\"Rockin' Around The Christmas Tree\",Brenda Lee,RATCTBL,1,40,4,NA,2,100,1960-12-12,https://www.billboard.com/charts/hot-100/2021-01-02\n");
        body.push_str("1,2020-12-26,All I Want For Christmas Is You,Mariah Carey,AIWFCIYMC,1,50,5,1,1,83,1994-12-17,https://www.billboard.com/charts/hot-100/2020-12-26\n");
        body
    }

    #[test]
    fn test_load_orders_by_position() {
        let dataset = ChartDataset::from_reader(sample_csv().as_bytes()).unwrap();
        let entries = dataset.load(date("2021-01-02"));

        assert_eq!(entries.len(), 3);
        let positions: Vec<u32> = entries.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(entries[0].song, "Blinding Lights");
        assert_eq!(entries[0].performer, "The Weeknd");
        assert!(entries.iter().all(|e| e.week == date("2021-01-02")));
    }

    #[test]
    fn test_missing_week_is_empty_not_error() {
        let dataset = ChartDataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert!(dataset.load(date("1999-01-01")).is_empty());
        assert!(!dataset.contains_week(date("1999-01-01")));
    }

    #[test]
    fn test_na_fields_are_tolerated() {
        let dataset = ChartDataset::from_reader(sample_csv().as_bytes()).unwrap();
        let christmas = dataset
            .rows()
            .iter()
            .find(|row| row.performer == "Brenda Lee")
            .unwrap();
        assert_eq!(christmas.previous_week, None);
        assert_eq!(christmas.peak_position, Some(2));
        assert_eq!(christmas.chart_debut, Some(date("1960-12-12")));
    }

    #[test]
    fn test_weeks_newest_first() {
        let dataset = ChartDataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(
            dataset.weeks(),
            vec![date("2021-01-02"), date("2020-12-26")]
        );
    }

    #[test]
    fn test_open_from_disk_with_minimal_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hot100.csv");
        fs::write(
            &path,
            "chart_position,chart_date,song,performer\n1,2000-01-01,Smooth,Santana\n0,2000-01-01,Broken,Row\n",
        )
        .unwrap();

        let dataset = ChartDataset::open(&path).unwrap();
        assert_eq!(dataset.rows().len(), 1);
        assert_eq!(dataset.load(date("2000-01-01"))[0].song, "Smooth");
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(ChartDataset::open(&dir.path().join("nope.csv")).is_err());
    }
}
