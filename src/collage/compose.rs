//! Tiles a folder of cover images into one poster.

use crate::collage::layout::{GridLayout, MAX_CANVAS_PIXELS};
use crate::collage::text::{draw_title_band, load_font};
use crate::collage::{CollageError, CollageOptions, FitMode, HexColor};
use crate::foundation::summary::BatchSummary;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Supported source image extensions.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const FINGERPRINT_EDGE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageReport {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub columns: u32,
    pub rows: u32,
    /// Images considered after the subset limit.
    pub considered: usize,
    pub placed: usize,
    pub skipped_corrupt: usize,
    pub skipped_duplicates: usize,
}

impl CollageReport {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            attempted: self.considered,
            succeeded: self.placed,
            skipped: self.skipped_corrupt + self.skipped_duplicates,
        }
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, CollageError> {
    if !dir.is_dir() {
        return Err(CollageError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    Ok(WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && has_image_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect())
}

// The format comes from the content, not the extension.
fn decode(path: &Path) -> Result<DynamicImage, CollageError> {
    let bytes = fs::read(path).map_err(|source| CollageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image::load_from_memory(&bytes)?)
}

fn fingerprint(image: &DynamicImage) -> u64 {
    let thumb = image
        .resize_exact(FINGERPRINT_EDGE, FINGERPRINT_EDGE, FilterType::Triangle)
        .to_luma8();
    let mut hasher = DefaultHasher::new();
    thumb.as_raw().hash(&mut hasher);
    hasher.finish()
}

/// Brings one source image to exactly the tile size.
fn render_tile(image: &DynamicImage, options: &CollageOptions) -> RgbaImage {
    let (width, height) = (options.tile_width, options.tile_height);
    let mut tile = match options.fit {
        FitMode::Crop => image.resize_to_fill(width, height, FilterType::Lanczos3).to_rgba8(),
        FitMode::Letterbox => {
            let scaled = image.resize(width, height, FilterType::Lanczos3).to_rgba8();
            let mut tile = RgbaImage::from_pixel(width, height, options.background.to_rgba());
            let x = (width.saturating_sub(scaled.width()) / 2) as i64;
            let y = (height.saturating_sub(scaled.height()) / 2) as i64;
            imageops::overlay(&mut tile, &scaled, x, y);
            tile
        }
    };
    round_corners(&mut tile, options.corner_radius);
    tile
}

// Makes the pixels outside the rounded corners transparent.
fn round_corners(tile: &mut RgbaImage, radius: u32) {
    let (width, height) = tile.dimensions();
    let radius = radius.min(width / 2).min(height / 2);
    if radius == 0 {
        return;
    }

    let r = radius as f32;
    for y in 0..height {
        let in_top = y < radius;
        let in_bottom = y >= height - radius;
        if !in_top && !in_bottom {
            continue;
        }
        let cy = if in_top { r } else { (height - radius) as f32 };
        for x in (0..radius).chain(width - radius..width) {
            let cx = if x < radius { r } else { (width - radius) as f32 };
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx.hypot(dy) > r {
                tile.get_pixel_mut(x, y)[3] = 0;
            }
        }
    }
}

fn save(canvas: RgbaImage, output: &Path) -> Result<(), CollageError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CollageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    // JPEG has no alpha channel.
    DynamicImage::ImageRgba8(canvas).to_rgb8().save(output)?;
    Ok(())
}

/// Composes `images` in the given order into a grid written to `output`.
///
/// Unreadable images are skipped. Fails with [`CollageError::EmptyInput`]
/// when nothing usable is left; the output file is then not created.
pub fn compose_collage(
    images: &[PathBuf],
    options: &CollageOptions,
    output: &Path,
) -> Result<CollageReport, CollageError> {
    if images.is_empty() {
        return Err(CollageError::EmptyInput);
    }
    if options.tile_width == 0 || options.tile_height == 0 {
        return Err(CollageError::InvalidOption("tile size must be positive".into()));
    }

    let font = match &options.title {
        Some(_) => {
            let path = options
                .font
                .as_deref()
                .ok_or_else(|| CollageError::FontNotFound("no font given for the title".into()))?;
            Some(load_font(path)?)
        }
        None => None,
    };

    let selected = match options.limit {
        Some(limit) => &images[..limit.min(images.len())],
        None => images,
    };

    let decoded: Vec<Option<DynamicImage>> = selected
        .par_iter()
        .map(|path| match decode(path) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "collage.image_skipped");
                None
            }
        })
        .collect();
    let skipped_corrupt = decoded.iter().filter(|image| image.is_none()).count();
    let mut usable: Vec<DynamicImage> = decoded.into_iter().flatten().collect();

    let mut skipped_duplicates = 0;
    if options.dedupe {
        let fingerprints: Vec<u64> = usable.par_iter().map(fingerprint).collect();
        let mut seen = HashSet::new();
        let mut keep = fingerprints.iter().map(|print| seen.insert(*print));
        let before = usable.len();
        usable.retain(|_| keep.next().unwrap_or(true));
        skipped_duplicates = before - usable.len();
    }

    if usable.is_empty() {
        return Err(CollageError::EmptyInput);
    }

    let layout = GridLayout::new(
        usable.len(),
        options.columns,
        options.tile_width,
        options.tile_height,
    );
    let (width, height) = layout.canvas_size().ok_or_else(|| {
        CollageError::InvalidOption(format!(
            "a {}x{} grid of {}x{} px tiles exceeds {} pixels",
            layout.columns, layout.rows, options.tile_width, options.tile_height, MAX_CANVAS_PIXELS
        ))
    })?;
    let background: HexColor = options.background;
    let mut canvas = RgbaImage::from_pixel(width, height, background.to_rgba());

    let tiles: Vec<RgbaImage> = usable
        .par_iter()
        .map(|image| render_tile(image, options))
        .collect();
    for (index, tile) in tiles.iter().enumerate() {
        let at = layout.placement(index);
        imageops::overlay(&mut canvas, tile, i64::from(at.x), i64::from(at.y));
    }

    if let (Some(title), Some(font)) = (options.title.as_deref(), font.as_ref()) {
        let band = options
            .title_band_height
            .unwrap_or(options.tile_height / 4)
            .max(1);
        draw_title_band(
            &mut canvas,
            band,
            background,
            font,
            title,
            options.subtitle.as_deref(),
        );
    }

    save(canvas, output)?;

    let report = CollageReport {
        output: output.to_path_buf(),
        width,
        height,
        columns: layout.columns,
        rows: layout.rows,
        considered: selected.len(),
        placed: usable.len(),
        skipped_corrupt,
        skipped_duplicates,
    };
    info!(
        output = %output.display(),
        width,
        height,
        columns = report.columns,
        rows = report.rows,
        summary = %report.summary(),
        "collage.done"
    );
    Ok(report)
}
