use crate::collage::{CollageOptions, Columns, FitMode, HexColor};
use config::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Prefix for environment overrides, e.g. `CHARTPOSTER_CATALOG__CLIENT_ID`.
pub const ENV_PREFIX: &str = "CHARTPOSTER";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    #[serde(default = "default_cover_art_dir")]
    pub cover_art_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: PathBuf,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub collage: CollageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            snapshot_dir: default_snapshot_dir(),
            cover_art_dir: default_cover_art_dir(),
            output_dir: default_output_dir(),
            fonts_dir: default_fonts_dir(),
            catalog: CatalogSettings::default(),
            collage: CollageSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/hot-100.csv")
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("json")
}

fn default_cover_art_dir() -> PathBuf {
    PathBuf::from("data/cover_art")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/outputs")
}

fn default_fonts_dir() -> PathBuf {
    PathBuf::from("fonts")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub api_base_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub search_limit: u32,
    pub fetch_audio_features: bool,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spotify.com/v1/".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            search_limit: 5,
            fetch_audio_features: true,
            timeout_secs: 10,
            connect_timeout_secs: 5,
            user_agent: concat!("chartposter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CatalogSettings {
    /// Returns the client credentials, falling back to the conventional
    /// `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` variables.
    pub fn credentials(&self) -> Option<(String, String)> {
        let id = non_empty(&self.client_id).or_else(|| env_non_empty("SPOTIFY_CLIENT_ID"))?;
        let secret =
            non_empty(&self.client_secret).or_else(|| env_non_empty("SPOTIFY_CLIENT_SECRET"))?;
        Some((id, secret))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().as_deref().and_then(non_empty)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollageSettings {
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: Columns,
    pub fit: FitMode,
    pub background_color: HexColor,
    pub corner_radius: u32,
    pub title_band_height: Option<u32>,
    pub dedupe: bool,
}

impl Default for CollageSettings {
    fn default() -> Self {
        Self {
            tile_width: 500,
            tile_height: 500,
            columns: Columns::Auto,
            fit: FitMode::Letterbox,
            background_color: HexColor::new(200, 180, 255),
            corner_radius: 0,
            title_band_height: None,
            dedupe: false,
        }
    }
}

impl CollageSettings {
    /// Base options for a collage; the caller layers per-run choices on top.
    pub fn to_options(&self) -> CollageOptions {
        CollageOptions {
            columns: self.columns,
            tile_width: self.tile_width.max(1),
            tile_height: self.tile_height.max(1),
            fit: self.fit,
            background: self.background_color,
            corner_radius: self.corner_radius,
            title_band_height: self.title_band_height,
            dedupe: self.dedupe,
            ..CollageOptions::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
    pub json: bool,
    pub include_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info,reqwest=warn".to_string(),
            json: false,
            include_target: false,
        }
    }
}

pub fn get_configuration(cfg_file: &Path) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::new(
            &cfg_file.to_string_lossy(),
            config::FileFormat::Yaml,
        ))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub struct ConfigFolder {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl ConfigFolder {
    pub fn new() -> Self {
        let home_dir = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self::in_home(Path::new(&home_dir))
    }

    pub fn in_home(home_dir: &Path) -> Self {
        Self {
            config_dir: get_config_dir_name(home_dir),
            config_file: get_config_file_name(home_dir),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.config_dir.exists() && self.config_file.exists()
    }
}

impl Default for ConfigFolder {
    fn default() -> Self {
        Self::new()
    }
}

fn get_config_dir_name(home_dir: &Path) -> PathBuf {
    home_dir.join(".chartposter")
}

fn get_config_file_name(home_dir: &Path) -> PathBuf {
    home_dir.join(".chartposter").join("config.yaml")
}

pub fn create_config(cfg_folder: ConfigFolder) -> anyhow::Result<()> {
    println!("\x1b[1m\x1b[32mCreating configuration...\x1b[0m");
    let config_dir = &cfg_folder.config_dir;

    if config_dir.exists() && !confirm_overwrite()? {
        println!("\x1b[33mOperation cancelled.\x1b[0m");
        return Ok(());
    }

    write_config_template(&cfg_folder)?;

    println!("\x1b[32mConfiguration folder created at:");
    println!("  -> ~/.chartposter");
    println!("Configuration file created at:");
    println!("  -> ~/.chartposter/config.yaml");
    println!("\x1b[0mPlease edit the configuration file with your dataset path and API credentials.");

    Ok(())
}

fn write_config_template(cfg_folder: &ConfigFolder) -> io::Result<()> {
    fs::create_dir_all(&cfg_folder.config_dir)?;
    let config_content = include_str!("config_template.yaml");
    fs::write(&cfg_folder.config_file, config_content)
}

fn confirm_overwrite() -> Result<bool, io::Error> {
    println!("\x1b[31mThe configuration folder already exists.");
    println!("Do you want to overwrite config.yaml? (y/N)\x1b[0m");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_template_parses_with_defaults() {
        let home = TempDir::new().unwrap();
        let folder = ConfigFolder::in_home(home.path());
        write_config_template(&folder).unwrap();
        assert!(folder.is_ready());

        let settings = get_configuration(&folder.config_file).unwrap();
        assert_eq!(settings.catalog.search_limit, 5);
        assert_eq!(settings.collage.tile_width, 500);
        assert_eq!(settings.collage.columns, Columns::Auto);
        assert_eq!(settings.collage.fit, FitMode::Letterbox);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "dataset_path: /tmp/hot100.csv\n");

        let settings = get_configuration(&path).unwrap();
        assert_eq!(settings.dataset_path, PathBuf::from("/tmp/hot100.csv"));
        assert_eq!(settings.snapshot_dir, PathBuf::from("json"));
        assert!(settings.catalog.fetch_audio_features);
        assert_eq!(settings.logging.filter, "info,reqwest=warn");
    }

    #[test]
    fn test_collage_section_is_parsed() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "collage:\n  columns: 4\n  fit: crop\n  background_color: \"#102030\"\n  tile_width: 300\n",
        );

        let settings = get_configuration(&path).unwrap();
        assert_eq!(settings.collage.columns, Columns::Fixed(4));
        assert_eq!(settings.collage.fit, FitMode::Crop);
        assert_eq!(settings.collage.background_color, HexColor::new(0x10, 0x20, 0x30));
        assert_eq!(settings.collage.tile_width, 300);
        assert_eq!(settings.collage.tile_height, 500);
    }

    #[test]
    fn test_config_folder_layout() {
        let folder = ConfigFolder::in_home(Path::new("/home/someone"));
        assert_eq!(folder.config_dir, PathBuf::from("/home/someone/.chartposter"));
        assert_eq!(
            folder.config_file,
            PathBuf::from("/home/someone/.chartposter/config.yaml")
        );
    }
}
