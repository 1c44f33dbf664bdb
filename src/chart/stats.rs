use crate::chart::ChartDataset;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformerCount {
    pub performer: String,
    pub count: usize,
}

impl ChartDataset {
    /// Total chart appearances per performer, most frequent first.
    pub fn performer_appearances(&self) -> Vec<PerformerCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in self.rows() {
            *counts.entry(row.performer.as_str()).or_default() += 1;
        }
        ranked(counts.into_iter())
    }

    /// Distinct songs that reached the chart per performer, most first.
    pub fn performer_unique_songs(&self) -> Vec<PerformerCount> {
        let mut songs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for row in self.rows() {
            songs
                .entry(row.performer.as_str())
                .or_default()
                .insert(row.song.as_str());
        }
        ranked(songs.into_iter().map(|(performer, set)| (performer, set.len())))
    }
}

// Sorted by count descending, ties alphabetical (the BTreeMap order survives the stable sort).
fn ranked<'a>(counts: impl Iterator<Item = (&'a str, usize)>) -> Vec<PerformerCount> {
    let mut ranked: Vec<PerformerCount> = counts
        .map(|(performer, count)| PerformerCount {
            performer: performer.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> ChartDataset {
        let csv = "chart_position,chart_date,song,performer\n\
                   1,2021-01-02,Positions,Ariana Grande\n\
                   2,2021-01-02,34+35,Ariana Grande\n\
                   3,2021-01-02,Mood,24kGoldn\n\
                   1,2021-01-09,Positions,Ariana Grande\n\
                   2,2021-01-09,Mood,24kGoldn\n\
                   3,2021-01-09,Levitating,Dua Lipa\n";
        ChartDataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_performer_appearances() {
        let counts = dataset().performer_appearances();
        assert_eq!(
            counts,
            vec![
                PerformerCount { performer: "Ariana Grande".into(), count: 3 },
                PerformerCount { performer: "24kGoldn".into(), count: 2 },
                PerformerCount { performer: "Dua Lipa".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_performer_unique_songs() {
        let counts = dataset().performer_unique_songs();
        assert_eq!(counts[0], PerformerCount { performer: "Ariana Grande".into(), count: 2 });
        // 24kGoldn and Dua Lipa tie on one song each; alphabetical order breaks the tie.
        assert_eq!(counts[1].performer, "24kGoldn");
        assert_eq!(counts[2].performer, "Dua Lipa");
    }
}
