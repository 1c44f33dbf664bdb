//! User-selectable collage parameters.

use image::Rgba;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Column count of the grid; `Auto` approximates a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Columns {
    #[default]
    Auto,
    Fixed(u32),
}

impl FromStr for Columns {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Ok(Columns::Auto);
        }
        match value.parse::<u32>() {
            Ok(0) => Err("columns must be at least 1".to_string()),
            Ok(n) => Ok(Columns::Fixed(n)),
            Err(_) => Err(format!("expected \"auto\" or a column count, got {value:?}")),
        }
    }
}

impl<'de> Deserialize<'de> for Columns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Count(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Count(n) if n >= 1 => u32::try_from(n)
                .map(Columns::Fixed)
                .map_err(serde::de::Error::custom),
            Repr::Count(n) => Err(serde::de::Error::custom(format!(
                "columns must be at least 1, got {n}"
            ))),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// How a source image is brought to the tile size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Scale to fit inside the tile, padding with the background.
    #[default]
    Letterbox,
    /// Scale to cover the tile and crop the overflow.
    Crop,
}

impl FromStr for FitMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "letterbox" => Ok(FitMode::Letterbox),
            "crop" => Ok(FitMode::Crop),
            other => Err(format!("unknown fit mode {other:?}, expected letterbox or crop")),
        }
    }
}

/// An opaque RGB colour written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    /// Perceived brightness in 0..=255.
    pub fn luminance(self) -> f32 {
        0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        HexColor::new(255, 255, 255)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("expected a colour like #RRGGBB, got {value:?}"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| e.to_string())
        };
        Ok(HexColor::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Size presets for a poster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subset {
    Small,
    Medium,
    Large,
    #[default]
    All,
}

impl Subset {
    /// How many images the preset takes; `None` takes every image.
    pub fn limit(self) -> Option<usize> {
        match self {
            Subset::Small => Some(35),
            Subset::Medium => Some(50),
            Subset::Large => Some(77),
            Subset::All => None,
        }
    }

    /// Column count of the preset; `None` keeps the configured columns.
    pub fn columns(self) -> Option<Columns> {
        match self {
            Subset::Small => Some(Columns::Fixed(5)),
            Subset::Medium => Some(Columns::Fixed(6)),
            Subset::Large => Some(Columns::Fixed(11)),
            Subset::All => None,
        }
    }
}

impl FromStr for Subset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Subset::Small),
            "medium" => Ok(Subset::Medium),
            "large" => Ok(Subset::Large),
            "all" => Ok(Subset::All),
            other => Err(format!(
                "unknown subset {other:?}, expected small, medium, large or all"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollageOptions {
    pub columns: Columns,
    pub tile_width: u32,
    pub tile_height: u32,
    pub fit: FitMode,
    pub background: HexColor,
    /// Radius of the rounded tile corners in pixels; 0 keeps square tiles.
    pub corner_radius: u32,
    /// Height of the title band; defaults to a quarter of a tile.
    pub title_band_height: Option<u32>,
    /// Drop images whose thumbnails are identical.
    pub dedupe: bool,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// Font file used for the title, required when a title is set.
    pub font: Option<PathBuf>,
    /// Use only the first `limit` images.
    pub limit: Option<usize>,
}

impl Default for CollageOptions {
    fn default() -> Self {
        Self {
            columns: Columns::Auto,
            tile_width: 500,
            tile_height: 500,
            fit: FitMode::Letterbox,
            background: HexColor::new(200, 180, 255),
            corner_radius: 0,
            title_band_height: None,
            dedupe: false,
            title: None,
            subtitle: None,
            font: None,
            limit: None,
        }
    }
}

impl CollageOptions {
    /// Applies a size preset on top of these options.
    pub fn with_subset(mut self, subset: Subset) -> Self {
        self.limit = subset.limit();
        if let Some(columns) = subset.columns() {
            self.columns = columns;
        }
        self
    }
}
