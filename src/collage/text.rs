//! Fonts and the title band drawn across the top of a collage.

use crate::collage::{CollageError, HexColor};
use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];
const BAND_OPACITY: f32 = 0.75;

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Font files directly inside `dir`, sorted by name. A missing folder has none.
pub fn list_fonts(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && has_font_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Finds the font to draw titles with.
///
/// `requested` may be a path, a file name inside `fonts_dir`, or a file name
/// without extension. Without a request the first font of `fonts_dir` is used.
pub fn resolve_font(requested: Option<&str>, fonts_dir: &Path) -> Result<PathBuf, CollageError> {
    let Some(requested) = requested else {
        return list_fonts(fonts_dir).into_iter().next().ok_or_else(|| {
            CollageError::FontNotFound(format!("no font files in {}", fonts_dir.display()))
        });
    };

    let direct = PathBuf::from(requested);
    if direct.is_file() {
        return Ok(direct);
    }
    let inside = fonts_dir.join(requested);
    if inside.is_file() {
        return Ok(inside);
    }

    list_fonts(fonts_dir)
        .into_iter()
        .find(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(|stem| stem.eq_ignore_ascii_case(requested))
                .unwrap_or(false)
        })
        .ok_or_else(|| CollageError::FontNotFound(requested.to_string()))
}

pub(crate) fn load_font(path: &Path) -> Result<FontVec, CollageError> {
    let bytes = fs::read(path).map_err(|source| CollageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| CollageError::InvalidFont {
        path: path.to_path_buf(),
    })
}

/// Black on light backgrounds, white on dark ones.
pub fn contrasting_text_color(background: HexColor) -> Rgba<u8> {
    if background.luminance() > 128.0 {
        Rgba([0, 0, 0, 255])
    } else {
        Rgba([255, 255, 255, 255])
    }
}

// Fades the top `height` rows towards the background colour in place.
fn blend_band(canvas: &mut RgbaImage, height: u32, background: HexColor) {
    let target = background.to_rgba();
    let height = height.min(canvas.height());
    for y in 0..height {
        for x in 0..canvas.width() {
            let pixel = canvas.get_pixel_mut(x, y);
            for channel in 0..3 {
                let current = f32::from(pixel[channel]);
                let wanted = f32::from(target[channel]);
                pixel[channel] = (current + (wanted - current) * BAND_OPACITY).round() as u8;
            }
        }
    }
}

// Largest scale not above `preferred` at which `text` fits in `max_width`.
fn fitting_scale(font: &FontVec, text: &str, preferred: f32, max_width: u32) -> PxScale {
    let scale = PxScale::from(preferred.max(1.0));
    let (width, _) = text_size(scale, font, text);
    if width <= max_width || width == 0 {
        return scale;
    }
    PxScale::from((preferred * max_width as f32 / width as f32).max(1.0))
}

/// Draws the title, and the subtitle below it, centred in the top band.
pub(crate) fn draw_title_band(
    canvas: &mut RgbaImage,
    band_height: u32,
    background: HexColor,
    font: &FontVec,
    title: &str,
    subtitle: Option<&str>,
) {
    let band_height = band_height.clamp(1, canvas.height());
    blend_band(canvas, band_height, background);

    let color = contrasting_text_color(background);
    let max_width = (canvas.width() as f32 * 0.9) as u32;
    let band = band_height as f32;

    let (title_scale, subtitle_scale) = match subtitle {
        Some(_) => (band * 0.45, band * 0.22),
        None => (band * 0.6, 0.0),
    };
    let title_scale = fitting_scale(font, title, title_scale, max_width);
    let (title_w, title_h) = text_size(title_scale, font, title);

    let sub = subtitle.map(|text| {
        let scale = fitting_scale(font, text, subtitle_scale, max_width);
        let (w, h) = text_size(scale, font, text);
        (text, scale, w, h)
    });

    let gap = if sub.is_some() { (band * 0.08) as u32 } else { 0 };
    let block_height = title_h + gap + sub.map(|(_, _, _, h)| h).unwrap_or(0);
    let top = band_height.saturating_sub(block_height) / 2;

    let canvas_width = canvas.width();
    let centred = |width: u32| (canvas_width.saturating_sub(width) / 2) as i32;
    let title_x = centred(title_w);
    draw_text_mut(canvas, color, title_x, top as i32, title_scale, font, title);

    if let Some((text, scale, width, _)) = sub {
        let x = centred(width);
        let y = (top + title_h + gap) as i32;
        draw_text_mut(canvas, color, x, y, scale, font, text);
    }
}
