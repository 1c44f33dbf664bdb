//! The three user-facing pipeline stages.
//!
//! Each stage reads its input artifact, runs to completion and answers with a
//! [`StageReport`] for display. Per-item failures show up in the report's
//! counts; only whole-stage preconditions turn into a failed report.

use crate::assets::{self, cover_folder_name, AssetDownloader, AssetFetch, HttpDownloader};
use crate::catalog::{Catalog, SpotifyCatalog};
use crate::chart::{ChartDataset, ChartEntry, ChartError};
use crate::collage::{
    self, list_images, resolve_font, CollageReport, Columns, FitMode, HexColor, Subset,
};
use crate::configuration::Settings;
use crate::enrich::{enrich, EnrichOptions, Snapshot};
use crate::foundation::summary::BatchSummary;
use crate::foundation::utils::create_progress_bar;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Success flag plus a message meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub success: bool,
    pub message: String,
}

impl StageReport {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    fn from_result<T>(stage: &str, result: Result<T>, describe: impl FnOnce(&T) -> String) -> Self {
        match result {
            Ok(value) => Self::success(describe(&value)),
            Err(e) => {
                error!(stage, error = format!("{e:#}"), "stage.failed");
                Self::failure(format!("{e:#}"))
            }
        }
    }
}

/// Per-run poster choices layered on top of the configured collage settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PosterRequest {
    pub dir: PathBuf,
    pub columns: Option<Columns>,
    pub subset: Subset,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// Path or name of a font inside the configured fonts folder.
    pub font: Option<String>,
    pub background: Option<HexColor>,
    pub fit: Option<FitMode>,
    pub output: Option<PathBuf>,
}

impl PosterRequest {
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichOutcome {
    pub snapshot_path: PathBuf,
    pub snapshot: Snapshot,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub dest: PathBuf,
    pub fetch: AssetFetch,
}

/// Loads one chart week, enriches it from the catalog and saves the snapshot.
pub async fn load_and_enrich(settings: &Settings, week: NaiveDate) -> StageReport {
    StageReport::from_result("enrich", run_enrich(settings, week).await, |outcome| {
        format!(
            "Enriched week {}: {}. Snapshot saved to {}",
            week,
            outcome.summary,
            outcome.snapshot_path.display()
        )
    })
}

/// Downloads the cover art referenced by a saved snapshot.
///
/// Without `dest` the covers go to `<cover_art_dir>/billboard_<week>`.
pub async fn fetch_assets(
    settings: &Settings,
    snapshot_path: &Path,
    dest: Option<&Path>,
) -> StageReport {
    StageReport::from_result(
        "fetch",
        run_fetch(settings, snapshot_path, dest).await,
        describe_fetch,
    )
}

/// Composes a poster from a folder of images.
pub fn compose_collage(settings: &Settings, request: &PosterRequest) -> StageReport {
    StageReport::from_result("poster", compose_poster(settings, request), describe_collage)
}

/// Runs the three stages for one week, stopping at the first failed stage.
///
/// The poster is built from the folder the covers were fetched into;
/// `request.dir` is ignored.
pub async fn run(settings: &Settings, week: NaiveDate, request: PosterRequest) -> Vec<StageReport> {
    let mut reports = Vec::with_capacity(3);

    let enriched = match run_enrich(settings, week).await {
        Ok(outcome) => outcome,
        Err(e) => {
            reports.push(StageReport::failure(format!("{e:#}")));
            return reports;
        }
    };
    reports.push(StageReport::success(format!(
        "Enriched week {}: {}",
        week, enriched.summary
    )));

    let fetched = match run_fetch(settings, &enriched.snapshot_path, None).await {
        Ok(outcome) => outcome,
        Err(e) => {
            reports.push(StageReport::failure(format!("{e:#}")));
            return reports;
        }
    };
    reports.push(StageReport::success(describe_fetch(&fetched)));

    let request = PosterRequest {
        dir: fetched.dest,
        ..request
    };
    reports.push(compose_collage(settings, &request));
    reports
}

async fn run_enrich(settings: &Settings, week: NaiveDate) -> Result<EnrichOutcome> {
    let dataset = ChartDataset::open(&settings.dataset_path).with_context(|| {
        format!("Failed to read the chart dataset {}", settings.dataset_path.display())
    })?;
    let entries = select_week(&dataset, week)?;

    let catalog = SpotifyCatalog::connect(&settings.catalog)
        .await
        .context("Failed to connect to the catalog")?;

    enrich_and_save(
        &entries,
        week,
        &catalog,
        &EnrichOptions::from(&settings.catalog),
        &settings.snapshot_dir,
    )
    .await
}

fn select_week(dataset: &ChartDataset, week: NaiveDate) -> Result<Vec<ChartEntry>, ChartError> {
    let entries = dataset.load(week);
    if entries.is_empty() {
        return Err(ChartError::WeekNotFound(week));
    }
    Ok(entries)
}

async fn enrich_and_save<C>(
    entries: &[ChartEntry],
    week: NaiveDate,
    catalog: &C,
    options: &EnrichOptions,
    snapshot_dir: &Path,
) -> Result<EnrichOutcome>
where
    C: Catalog + ?Sized + Sync,
{
    info!(%week, entries = entries.len(), "stage.enrich.start");
    let progress = create_progress_bar(entries.len() as u64, "tracks");
    let enrichment = enrich(entries, catalog, options, &progress).await;
    progress.finish_and_clear();

    let snapshot = Snapshot::new(week, enrichment.entries);
    let snapshot_path = snapshot
        .write(snapshot_dir)
        .context("Failed to save the enriched snapshot")?;

    Ok(EnrichOutcome {
        snapshot_path,
        snapshot,
        summary: enrichment.summary,
    })
}

async fn run_fetch(
    settings: &Settings,
    snapshot_path: &Path,
    dest: Option<&Path>,
) -> Result<FetchOutcome> {
    let downloader =
        HttpDownloader::new(&settings.catalog).context("Failed to build the download client")?;
    fetch_snapshot(settings, snapshot_path, dest, &downloader).await
}

async fn fetch_snapshot<D>(
    settings: &Settings,
    snapshot_path: &Path,
    dest: Option<&Path>,
    downloader: &D,
) -> Result<FetchOutcome>
where
    D: AssetDownloader + ?Sized + Sync,
{
    let snapshot = Snapshot::read(snapshot_path)
        .with_context(|| format!("Failed to read snapshot {}", snapshot_path.display()))?;
    let dest = match dest {
        Some(dest) => dest.to_path_buf(),
        None => settings
            .cover_art_dir
            .join(cover_folder_name(snapshot.week)),
    };

    info!(week = %snapshot.week, dest = %dest.display(), "stage.fetch.start");
    let progress = create_progress_bar(snapshot.entries.len() as u64, "covers");
    let fetch = assets::fetch_assets(&snapshot.entries, &dest, downloader, &progress).await;
    progress.finish_and_clear();

    let fetch = fetch.context("Failed to prepare the cover art folder")?;
    Ok(FetchOutcome { dest, fetch })
}

fn default_output(settings: &Settings, dir: &Path) -> PathBuf {
    let folder = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "collage".to_string());
    settings.output_dir.join(format!("poster_{folder}.jpg"))
}

fn compose_poster(settings: &Settings, request: &PosterRequest) -> Result<CollageReport> {
    let mut options = settings.collage.to_options().with_subset(request.subset);
    if let Some(columns) = request.columns {
        options.columns = columns;
    }
    if let Some(fit) = request.fit {
        options.fit = fit;
    }
    if let Some(background) = request.background {
        options.background = background;
    }
    if request.title.is_some() {
        options.title = request.title.clone();
        options.subtitle = request.subtitle.clone();
        options.font = Some(resolve_font(request.font.as_deref(), &settings.fonts_dir)?);
    }

    let images = list_images(&request.dir)
        .with_context(|| format!("Failed to list images in {}", request.dir.display()))?;
    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output(settings, &request.dir));

    info!(dir = %request.dir.display(), images = images.len(), "stage.poster.start");
    Ok(collage::compose_collage(&images, &options, &output)?)
}

fn describe_fetch(outcome: &FetchOutcome) -> String {
    format!(
        "Stored {} covers in {} ({})",
        outcome.fetch.records.len(),
        outcome.dest.display(),
        outcome.fetch.summary
    )
}

fn describe_collage(report: &CollageReport) -> String {
    format!(
        "Poster saved to {} ({}x{} px, {} columns x {} rows; {})",
        report.output.display(),
        report.width,
        report.height,
        report.columns,
        report.rows,
        report.summary()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MockAssetDownloader;
    use crate::catalog::{CatalogTrack, MockCatalog};
    use crate::collage::CollageError;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    const WEEK: &str = "1984-03-10";

    fn week() -> NaiveDate {
        NaiveDate::parse_from_str(WEEK, "%Y-%m-%d").unwrap()
    }

    fn dataset() -> ChartDataset {
        let mut csv = String::from("chart_position,chart_date,song,performer\n");
        for (position, song, performer) in [
            (1, "Jump", "Van Halen"),
            (2, "Footloose", "Kenny Loggins"),
            (3, "Somebody's Watching Me", "Rockwell"),
            (4, "Unreleased Demo", "Nobody"),
            (5, "Thriller", "Michael Jackson"),
        ] {
            csv.push_str(&format!("{position},{WEEK},\"{song}\",{performer}\n"));
        }
        csv.push_str("1,1984-03-03,Jump,Van Halen\n");
        ChartDataset::from_reader(csv.as_bytes()).unwrap()
    }

    fn track(name: &str) -> CatalogTrack {
        CatalogTrack {
            id: format!("id-{}", name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            artists: vec![],
            album_name: None,
            release_date: Some("1984-01-01".into()),
            image_url: Some(format!("https://img.example/{}.jpg", name.len())),
            duration_ms: None,
            explicit: None,
            popularity: None,
            track_url: None,
        }
    }

    // The catalog knows every song except the unreleased demo.
    fn catalog() -> MockCatalog {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_tracks().returning(|query, _| {
            if query.contains("Unreleased Demo") {
                return Ok(vec![]);
            }
            let song = query
                .trim_start_matches("track:\"")
                .split('"')
                .next()
                .unwrap_or_default()
                .to_string();
            Ok(vec![track(&song)])
        });
        catalog
    }

    fn png_bytes(color: Rgb<u8>) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        RgbImage::from_pixel(16, 16, color)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn settings(root: &TempDir) -> Settings {
        let mut settings = Settings {
            snapshot_dir: root.path().join("json"),
            cover_art_dir: root.path().join("covers"),
            output_dir: root.path().join("outputs"),
            fonts_dir: root.path().join("fonts"),
            ..Settings::default()
        };
        settings.collage.tile_width = 20;
        settings.collage.tile_height = 20;
        settings
    }

    fn no_features() -> EnrichOptions {
        EnrichOptions {
            search_limit: 5,
            fetch_audio_features: false,
        }
    }

    #[test]
    fn test_missing_week_is_not_found() {
        let missing = NaiveDate::from_ymd_opt(1999, 1, 2).unwrap();
        let result = select_week(&dataset(), missing);
        assert!(matches!(result, Err(ChartError::WeekNotFound(w)) if w == missing));
        assert_eq!(select_week(&dataset(), week()).unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_week_to_poster_scenario() {
        let root = TempDir::new().unwrap();
        let settings = settings(&root);

        // Enrich: five entries in, four matched.
        let entries = select_week(&dataset(), week()).unwrap();
        let enriched = enrich_and_save(
            &entries,
            week(),
            &catalog(),
            &no_features(),
            &settings.snapshot_dir,
        )
        .await
        .unwrap();

        assert_eq!(enriched.snapshot.entries.len(), 5);
        let with_art = enriched
            .snapshot
            .entries
            .iter()
            .filter(|e| e.album_art_url.is_some())
            .count();
        assert_eq!(with_art, 4);
        assert!(enriched.snapshot.entries[3].album_art_url.is_none());
        assert_eq!(
            enriched.snapshot_path,
            settings.snapshot_dir.join("billboard_1984-03-10.json")
        );

        // Fetch: exactly four downloads.
        let mut downloader = MockAssetDownloader::new();
        downloader
            .expect_download()
            .times(4)
            .returning(|_| Ok(png_bytes(Rgb([220, 30, 30]))));
        let fetched = fetch_snapshot(&settings, &enriched.snapshot_path, None, &downloader)
            .await
            .unwrap();

        assert_eq!(fetched.dest, settings.cover_art_dir.join("billboard_1984-03-10"));
        assert_eq!(fetched.fetch.records.len(), 4);
        assert_eq!(fetched.fetch.summary.downloaded, 4);
        assert_eq!(fetched.fetch.summary.no_art, 1);

        // Compose: four images with auto columns make a 2x2 grid.
        let report = compose_poster(&settings, &PosterRequest::for_dir(&fetched.dest)).unwrap();

        assert_eq!((report.columns, report.rows), (2, 2));
        assert_eq!((report.width, report.height), (40, 40));
        assert_eq!(
            report.output,
            settings.output_dir.join("poster_billboard_1984-03-10.jpg")
        );
        assert!(report.output.exists());
    }

    #[tokio::test]
    async fn test_refetch_reuses_existing_covers() {
        let root = TempDir::new().unwrap();
        let settings = settings(&root);
        let entries = select_week(&dataset(), week()).unwrap();
        let enriched = enrich_and_save(
            &entries,
            week(),
            &catalog(),
            &no_features(),
            &settings.snapshot_dir,
        )
        .await
        .unwrap();

        let mut first = MockAssetDownloader::new();
        first
            .expect_download()
            .returning(|_| Ok(png_bytes(Rgb([0, 0, 0]))));
        let dest = root.path().join("custom");
        fetch_snapshot(&settings, &enriched.snapshot_path, Some(&dest), &first)
            .await
            .unwrap();

        let mut second = MockAssetDownloader::new();
        second.expect_download().times(0);
        let again = fetch_snapshot(&settings, &enriched.snapshot_path, Some(&dest), &second)
            .await
            .unwrap();
        assert_eq!(again.fetch.summary.reused, 4);
        assert_eq!(again.dest, dest);
    }

    #[test]
    fn test_poster_on_empty_folder_fails() {
        let root = TempDir::new().unwrap();
        let settings = settings(&root);
        let empty = root.path().join("empty");
        std::fs::create_dir_all(&empty).unwrap();

        let report = compose_collage(&settings, &PosterRequest::for_dir(&empty));
        assert!(!report.success);

        let err = compose_poster(&settings, &PosterRequest::for_dir(&empty)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CollageError>(),
            Some(CollageError::EmptyInput)
        ));
        assert!(!settings.output_dir.join("poster_empty.jpg").exists());
    }

    #[test]
    fn test_title_needs_a_font() {
        let root = TempDir::new().unwrap();
        let settings = settings(&root);
        let request = PosterRequest {
            title: Some("Hot 100".into()),
            ..PosterRequest::for_dir(root.path())
        };

        let err = compose_poster(&settings, &request).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CollageError>(),
            Some(CollageError::FontNotFound(_))
        ));
    }

    #[test]
    fn test_stage_report_messages() {
        let ok = StageReport::from_result("test", Ok(3), |n| format!("{n} done"));
        assert_eq!(ok, StageReport::success("3 done"));

        let failed: Result<u32> = Err(anyhow::anyhow!("boom")).context("Stage broke");
        let report = StageReport::from_result("test", failed, |_| unreachable!());
        assert!(!report.success);
        assert_eq!(report.message, "Stage broke: boom");
    }
}
