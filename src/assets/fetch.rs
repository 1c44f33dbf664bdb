//! Downloads cover art for enriched entries into one folder per chart week.
//!
//! An existing target file means the entry is done; re-running the stage
//! only downloads what is still missing.

use crate::assets::{AssetDownloader, FetchError};
use crate::enrich::EnrichedEntry;
use crate::foundation::summary::BatchSummary;
use crate::foundation::utils::sanitize_file_component;
use chrono::NaiveDate;
use indicatif::ProgressBar;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const MAX_NAME_GRAPHEMES: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSource {
    Downloaded,
    Existing,
}

/// One stored cover, linked back to the chart entry it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    pub position: u32,
    pub song: String,
    pub performer: String,
    pub track_id: Option<String>,
    pub path: PathBuf,
    pub source: AssetSource,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchSummary {
    pub attempted: usize,
    pub downloaded: usize,
    pub reused: usize,
    pub no_art: usize,
    pub failed: usize,
}

impl FetchSummary {
    /// Collapses the detailed counts into the common batch shape.
    pub fn batch(&self) -> BatchSummary {
        BatchSummary {
            attempted: self.attempted,
            succeeded: self.downloaded + self.reused,
            skipped: self.no_art + self.failed,
        }
    }
}

impl fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempted {}, downloaded {}, reused {}, no art {}, failed {}",
            self.attempted, self.downloaded, self.reused, self.no_art, self.failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct AssetFetch {
    pub records: Vec<AssetRecord>,
    pub summary: FetchSummary,
}

/// `billboard_<YYYY-MM-DD>`
pub fn cover_folder_name(week: NaiveDate) -> String {
    format!("billboard_{}", week.format("%Y-%m-%d"))
}

/// `<position>_<song> - <performer>.jpg`, safe to use as a file name.
///
/// The position is padded to three digits so a plain name sort keeps chart
/// order up to position 999.
pub fn asset_file_name(entry: &EnrichedEntry) -> String {
    let stem = format!("{} - {}", entry.entry.song, entry.entry.performer);
    format!(
        "{:03}_{}.jpg",
        entry.entry.position,
        sanitize_file_component(&stem, MAX_NAME_GRAPHEMES)
    )
}

/// Stores the artwork of every entry that has one, in input order.
///
/// Entries without an artwork URL and failed downloads are left out of the
/// returned records; neither stops the batch.
pub async fn fetch_assets<D>(
    entries: &[EnrichedEntry],
    dest: &Path,
    downloader: &D,
    progress: &ProgressBar,
) -> Result<AssetFetch, FetchError>
where
    D: AssetDownloader + ?Sized + Sync,
{
    fs::create_dir_all(dest).map_err(|source| FetchError::Write {
        path: dest.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    let mut summary = FetchSummary::default();

    for enriched in entries {
        summary.attempted += 1;
        let entry = &enriched.entry;

        let Some(url) = enriched.album_art_url.as_deref() else {
            info!(position = entry.position, song = %entry.song, "assets.no_art");
            summary.no_art += 1;
            progress.inc(1);
            continue;
        };

        let path = dest.join(asset_file_name(enriched));
        progress.set_message(format!("#{} {}", entry.position, entry.song));

        let source = if path.exists() {
            summary.reused += 1;
            Some(AssetSource::Existing)
        } else {
            match store(downloader, url, &path).await {
                Ok(()) => {
                    summary.downloaded += 1;
                    Some(AssetSource::Downloaded)
                }
                Err(e) => {
                    warn!(position = entry.position, url, error = %e, "assets.download_failed");
                    summary.failed += 1;
                    None
                }
            }
        };

        if let Some(source) = source {
            records.push(AssetRecord {
                position: entry.position,
                song: entry.song.clone(),
                performer: entry.performer.clone(),
                track_id: enriched.track_id.clone(),
                path,
                source,
            });
        }
        progress.inc(1);
    }

    info!(%summary, dest = %dest.display(), "assets.done");
    Ok(AssetFetch { records, summary })
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

// The final name only appears once the bytes are fully on disk.
async fn store<D>(downloader: &D, url: &str, path: &Path) -> Result<(), FetchError>
where
    D: AssetDownloader + ?Sized + Sync,
{
    let bytes = downloader.download(url).await?;
    let partial = partial_path(path);
    let written = fs::write(&partial, bytes).and_then(|()| fs::rename(&partial, path));
    written.map_err(|source| {
        let _ = fs::remove_file(&partial);
        FetchError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}
