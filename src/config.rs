//! Viewer configuration loaded from TOML.
//!
//! ```toml
//! [waveform]
//! resolution = 500
//! height_px = 120
//! bar_color_played = "#4cb3ff"
//! bar_color_unplayed = "#8a8f984d"
//! progress_line_color = "#4cb3ff"
//! ```
//!
//! Values are validated once here so rendering never has to second-guess them.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::waveform::{Rgba, WaveformPalette, DEFAULT_RESOLUTION, MAX_RESOLUTION};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "STEMVIEW_CONFIG";
/// Config file picked up from the working directory when present.
pub const CONFIG_FILE_NAME: &str = "stemview.toml";
pub const DEFAULT_HEIGHT_PX: u32 = 120;

/// Errors raised while reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("resolution must be between 1 and {max}, got {0}", max = MAX_RESOLUTION)]
    InvalidResolution(i64),
    #[error("height_px must be between 1 and {max}, got {value}", max = u32::MAX)]
    InvalidHeight { value: i64 },
    #[error("{field} is not a #RRGGBB or #RRGGBBAA color: {value:?}")]
    InvalidColor { field: &'static str, value: String },
}

/// Raw `[waveform]` table as written by the user.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveformSection {
    pub resolution: i64,
    pub height_px: i64,
    pub bar_color_played: String,
    pub bar_color_unplayed: String,
    pub progress_line_color: String,
}

impl Default for WaveformSection {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION.get() as i64,
            height_px: DEFAULT_HEIGHT_PX as i64,
            bar_color_played: "#4cb3ff".into(),
            bar_color_unplayed: "#8a8f984d".into(),
            progress_line_color: "#4cb3ff".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    waveform: WaveformSection,
}

/// Validated waveform settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformConfig {
    pub resolution: NonZeroUsize,
    pub height_px: u32,
    pub palette: WaveformPalette,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            height_px: DEFAULT_HEIGHT_PX,
            palette: WaveformPalette::default(),
        }
    }
}

impl TryFrom<WaveformSection> for WaveformConfig {
    type Error = ConfigError;

    fn try_from(section: WaveformSection) -> Result<Self, Self::Error> {
        let resolution = usize::try_from(section.resolution)
            .ok()
            .filter(|&n| n <= MAX_RESOLUTION)
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::InvalidResolution(section.resolution))?;
        let height_px = u32::try_from(section.height_px)
            .ok()
            .filter(|&h| h > 0)
            .ok_or(ConfigError::InvalidHeight {
                value: section.height_px,
            })?;
        Ok(Self {
            resolution,
            height_px,
            palette: WaveformPalette {
                played: parse_color("bar_color_played", &section.bar_color_played)?,
                unplayed: parse_color("bar_color_unplayed", &section.bar_color_unplayed)?,
                progress_line: parse_color("progress_line_color", &section.progress_line_color)?,
            },
        })
    }
}

fn parse_color(field: &'static str, value: &str) -> Result<Rgba, ConfigError> {
    Rgba::from_hex(value).ok_or_else(|| ConfigError::InvalidColor {
        field,
        value: value.to_string(),
    })
}

/// Parse and validate config text; `path` is only used in error messages.
pub fn parse(text: &str, path: &Path) -> Result<WaveformConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    WaveformConfig::try_from(file.waveform)
}

/// Load config from `path`.
pub fn load_from(path: &Path) -> Result<WaveformConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

/// Load from `$STEMVIEW_CONFIG`, else `./stemview.toml`, else defaults.
pub fn load_or_default() -> Result<WaveformConfig, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return load_from(Path::new(&path));
    }
    let local = Path::new(CONFIG_FILE_NAME);
    if local.exists() {
        return load_from(local);
    }
    Ok(WaveformConfig::default())
}
