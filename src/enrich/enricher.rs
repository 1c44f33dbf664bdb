//! Looks every chart entry up in the catalog and merges the result.
//!
//! The loop is sequential and tolerant: a miss, an HTTP error or a rate limit
//! on one entry marks that entry as unmatched and the batch moves on.

use crate::catalog::{
    advanced_query, naive_query, pick_best_match, AudioFeatures, Catalog, CatalogError,
    CatalogTrack,
};
use crate::chart::ChartEntry;
use crate::configuration::CatalogSettings;
use crate::enrich::EnrichedEntry;
use crate::foundation::summary::BatchSummary;
use chrono::Datelike;
use indicatif::ProgressBar;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    pub search_limit: u32,
    pub fetch_audio_features: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            search_limit: 5,
            fetch_audio_features: true,
        }
    }
}

impl From<&CatalogSettings> for EnrichOptions {
    fn from(settings: &CatalogSettings) -> Self {
        Self {
            search_limit: settings.search_limit.max(1),
            fetch_audio_features: settings.fetch_audio_features,
        }
    }
}

/// Result of one enrichment batch. `summary.skipped` counts lookup misses.
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub entries: Vec<EnrichedEntry>,
    pub summary: BatchSummary,
}

/// Enriches `entries` in order; the output has exactly one entry per input.
///
/// Identical (song, performer) pairs are looked up independently.
pub async fn enrich<C>(
    entries: &[ChartEntry],
    catalog: &C,
    options: &EnrichOptions,
    progress: &ProgressBar,
) -> Enrichment
where
    C: Catalog + ?Sized + Sync,
{
    let mut enriched = Vec::with_capacity(entries.len());
    let mut summary = BatchSummary::default();

    for entry in entries {
        progress.set_message(format!("#{} {} - {}", entry.position, entry.performer, entry.song));

        match lookup(catalog, entry, options).await {
            Ok(Some(track)) => {
                let features = if options.fetch_audio_features {
                    features_for(catalog, &track).await
                } else {
                    None
                };
                enriched.push(EnrichedEntry::matched(entry.clone(), track, features));
                summary.record_success();
            }
            Ok(None) => {
                warn!(position = entry.position, song = %entry.song, performer = %entry.performer, "enrich.no_match");
                enriched.push(EnrichedEntry::unmatched(entry.clone()));
                summary.record_skip();
            }
            Err(e) => {
                warn!(position = entry.position, song = %entry.song, performer = %entry.performer, error = %e, "enrich.lookup_failed");
                enriched.push(EnrichedEntry::unmatched(entry.clone()));
                summary.record_skip();
            }
        }

        progress.inc(1);
    }

    info!(%summary, "enrich.done");
    Enrichment {
        entries: enriched,
        summary,
    }
}

/// Qualified query first, plain query when it comes back empty.
async fn lookup<C>(
    catalog: &C,
    entry: &ChartEntry,
    options: &EnrichOptions,
) -> Result<Option<CatalogTrack>, CatalogError>
where
    C: Catalog + ?Sized + Sync,
{
    let mut candidates = catalog
        .search_tracks(&advanced_query(&entry.song, &entry.performer), options.search_limit)
        .await?;

    if candidates.is_empty() {
        candidates = catalog
            .search_tracks(&naive_query(&entry.song, &entry.performer), options.search_limit)
            .await?;
    }

    Ok(pick_best_match(&candidates, &entry.song, entry.week.year()).cloned())
}

// A features failure keeps the match; only the attributes go missing.
async fn features_for<C>(catalog: &C, track: &CatalogTrack) -> Option<AudioFeatures>
where
    C: Catalog + ?Sized + Sync,
{
    match catalog.audio_features(&track.id).await {
        Ok(features) => features,
        Err(e) => {
            warn!(track_id = %track.id, error = %e, "enrich.audio_features_failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockCatalog;
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    fn entry(position: u32, song: &str, performer: &str) -> ChartEntry {
        ChartEntry {
            position,
            song: song.into(),
            performer: performer.into(),
            week: NaiveDate::from_ymd_opt(1984, 3, 10).unwrap(),
        }
    }

    fn track(id: &str, name: &str, release_date: &str) -> CatalogTrack {
        CatalogTrack {
            id: id.into(),
            name: name.into(),
            artists: vec!["Van Halen".into()],
            album_name: Some("1984".into()),
            release_date: Some(release_date.into()),
            image_url: Some(format!("https://img.example/{id}.jpg")),
            duration_ms: Some(241_000),
            explicit: Some(false),
            popularity: Some(70),
            track_url: None,
        }
    }

    fn options(fetch_audio_features: bool) -> EnrichOptions {
        EnrichOptions {
            search_limit: 5,
            fetch_audio_features,
        }
    }

    #[tokio::test]
    async fn test_match_merges_fields_and_features() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks()
            .with(eq("track:\"Jump\" artist:\"Van Halen\""), eq(5))
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    track("remaster", "Jump - 2015 Remaster", "2015-01-01"),
                    track("original", "Jump", "1984-01-09"),
                ])
            });
        catalog
            .expect_audio_features()
            .with(eq("original"))
            .times(1)
            .returning(|_| {
                let mut features = AudioFeatures::new();
                features.insert("tempo".into(), 129.9);
                Ok(Some(features))
            });

        let entries = vec![entry(1, "Jump", "Van Halen")];
        let result = enrich(&entries, &catalog, &options(true), &ProgressBar::hidden()).await;

        assert_eq!(result.entries.len(), 1);
        let enriched = &result.entries[0];
        assert_eq!(enriched.entry, entries[0]);
        assert_eq!(enriched.track_id.as_deref(), Some("original"));
        assert_eq!(
            enriched.album_art_url.as_deref(),
            Some("https://img.example/original.jpg")
        );
        assert_eq!(enriched.audio_features.as_ref().unwrap()["tempo"], 129.9);
        assert_eq!(result.summary.succeeded, 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_naive_query() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks()
            .with(eq("track:\"Jump\" artist:\"Van Halen\""), eq(5))
            .times(1)
            .returning(|_, _| Ok(vec![]));
        catalog
            .expect_search_tracks()
            .with(eq("Jump Van Halen"), eq(5))
            .times(1)
            .returning(|_, _| Ok(vec![track("naive", "Jump", "1984")]));

        let entries = vec![entry(1, "Jump", "Van Halen")];
        let result = enrich(&entries, &catalog, &options(false), &ProgressBar::hidden()).await;

        assert_eq!(result.entries[0].track_id.as_deref(), Some("naive"));
        assert!(result.entries[0].audio_features.is_none());
    }

    #[tokio::test]
    async fn test_failures_never_abort_the_batch() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_tracks().returning(|query, _| {
            if query.contains("Broken") {
                Err(CatalogError::RateLimited { retry_after: Some(3) })
            } else if query.contains("Missing") {
                Ok(vec![])
            } else {
                Ok(vec![track("found", "Found", "1984")])
            }
        });
        catalog
            .expect_audio_features()
            .returning(|_| Err(CatalogError::Api { status: 403, message: "forbidden".into() }));

        let entries = vec![
            entry(1, "Found", "A"),
            entry(2, "Broken", "B"),
            entry(3, "Missing", "C"),
            entry(4, "Found", "A"),
        ];
        let result = enrich(&entries, &catalog, &options(true), &ProgressBar::hidden()).await;

        assert_eq!(result.entries.len(), 4);
        let positions: Vec<u32> = result.entries.iter().map(|e| e.entry.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);

        assert!(result.entries[0].is_matched());
        assert!(result.entries[0].audio_features.is_none());
        assert!(!result.entries[1].is_matched());
        assert!(result.entries[1].album_art_url.is_none());
        assert!(!result.entries[2].is_matched());
        // Duplicates are looked up again rather than reused.
        assert!(result.entries[3].is_matched());

        assert_eq!(
            result.summary,
            BatchSummary { attempted: 4, succeeded: 2, skipped: 2 }
        );
    }
}
