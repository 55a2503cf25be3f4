use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{Result, TokenError};
use crate::tokenops::{
    border::validate_geometry, parse_hex_color, TokenParams, DEFAULT_BORDER_WIDTH,
    DEFAULT_BRIGHTNESS, DEFAULT_CONTRAST, DEFAULT_SCALE,
};

pub const SETTINGS_FILE_NAME: &str = "config.json";

/// Command line of the token tool. Every setting can also come from the
/// JSON settings file; flags given here win.
#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image files, directories, or http(s) URLs
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Settings file; defaults to `config.json` next to the executable
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub scale: Option<f32>,

    #[arg(short, long)]
    pub border_width: Option<f32>,

    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Border color as #RRGGBB; without it the border takes the image's tone
    #[arg(long)]
    pub color: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub brightness: Option<i32>,

    #[arg(long, allow_hyphen_values = true)]
    pub contrast: Option<f32>,

    #[arg(short, long, default_value_t = 1)]
    pub num_threads: usize,

    /// Seconds to wait before exiting, keeps a drag-and-drop console open
    #[arg(long, default_value_t = 0)]
    pub linger_secs: u64,
}

/// Settings as stored in the JSON file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub scale: f32,
    pub border_width: f32,
    pub output_dir: PathBuf,
    pub color: Option<String>,
    pub brightness: i32,
    pub contrast: f32,
    pub name_prefix: String,
    pub strip_prefix: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            border_width: DEFAULT_BORDER_WIDTH,
            output_dir: PathBuf::from("output"),
            color: None,
            brightness: DEFAULT_BRIGHTNESS,
            contrast: DEFAULT_CONTRAST,
            name_prefix: "token_".to_string(),
            strip_prefix: None,
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| TokenError::FileSystem {
            path: path.to_path_buf(),
            operation: "read settings".to_string(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    /// Loads the settings named on the command line, or the default file next
    /// to the executable. Only the default file may be absent.
    pub fn load(cli: &Cli) -> Result<Self> {
        let settings = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => match default_settings_path() {
                Some(path) if path.is_file() => {
                    debug!("Loading settings from {}", path.display());
                    Self::from_file(&path)?
                }
                _ => {
                    warn!("No {SETTINGS_FILE_NAME} found next to the executable, using defaults");
                    Self::default()
                }
            },
        };
        let settings = settings.with_overrides(cli);
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(scale) = cli.scale {
            self.scale = scale;
        }
        if let Some(border_width) = cli.border_width {
            self.border_width = border_width;
        }
        if let Some(output_dir) = &cli.output_dir {
            self.output_dir = output_dir.clone();
        }
        if let Some(color) = &cli.color {
            self.color = Some(color.clone());
        }
        if let Some(brightness) = cli.brightness {
            self.brightness = brightness;
        }
        if let Some(contrast) = cli.contrast {
            self.contrast = contrast;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_geometry(self.scale, self.border_width)?;
        if !self.contrast.is_finite() {
            return Err(TokenError::validation("contrast", "must be finite"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(TokenError::validation("outputDir", "must not be empty"));
        }
        Ok(())
    }

    pub fn token_params(&self) -> TokenParams {
        TokenParams {
            scale: self.scale,
            border_width: self.border_width,
            border_color: self.color.as_deref().map(|hex| {
                let color = parse_hex_color(hex);
                if color == image::Rgba([0, 0, 0, 255]) && !is_black_hex(hex) {
                    warn!("Malformed border color {hex:?}, falling back to black");
                }
                color
            }),
            brightness: self.brightness,
            contrast: self.contrast,
        }
    }
}

fn is_black_hex(hex: &str) -> bool {
    hex.strip_prefix('#').unwrap_or(hex) == "000000"
}

fn default_settings_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(SETTINGS_FILE_NAME))
}
