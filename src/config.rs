use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ffmpeg::profile::DEFAULT_VIDEO_BITRATE;
use crate::ui::prelude::{Level, emit};

pub const LOCAL_CONFIG_NAME: &str = "ose.toml";

const LOGO_WITH_TEXT: &str = "logo-with-text.png";
const LOGO: &str = "logo.png";
const FONT_FILE: &str = "mmrtextb.ttf";

/// Compiled-in defaults, optionally overridden by a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Background color of the title and end cards
    pub background_color: String,
    /// Title card length in seconds
    pub title_duration: f64,
    /// End card length in seconds
    pub end_duration: f64,
    /// First credits line on the end card
    pub credits_heading: String,
    /// Second credits line on the end card
    pub credits_line: String,
    /// Directory holding the logos and the font; defaults to the data dir
    pub resources_dir: Option<PathBuf>,
    /// Source clip name inside each date directory
    pub clip_file_name: String,
    /// Normalized clip name inside each date directory
    pub output_file_name: String,
    pub title_file_name: String,
    pub end_file_name: String,
    pub final_video_name: String,
    pub manifest_name: String,
    /// Reuse existing normalized clips when they already match the profile
    pub reuse_outputs: bool,
    pub video_bitrate: String,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            background_color: "#2f3136".to_string(),
            title_duration: Self::DEFAULT_TITLE_DURATION,
            end_duration: Self::DEFAULT_END_DURATION,
            credits_heading: "Brought to you by".to_string(),
            credits_line: "@DV8FromTheWorld, @mistersender, and @1SE".to_string(),
            resources_dir: None,
            clip_file_name: "clip.mp4".to_string(),
            output_file_name: "output.mp4".to_string(),
            title_file_name: "title-clip.mp4".to_string(),
            end_file_name: "end-clip.mp4".to_string(),
            final_video_name: "1SE-video.mp4".to_string(),
            manifest_name: "concatable-files.txt".to_string(),
            reuse_outputs: false,
            video_bitrate: DEFAULT_VIDEO_BITRATE.to_string(),
        }
    }
}

impl CompileConfig {
    pub const DEFAULT_TITLE_DURATION: f64 = 2.5;
    pub const DEFAULT_END_DURATION: f64 = 4.0;
    /// The end card fades out over its last second, so it cannot be shorter.
    const MIN_CARD_DURATION: f64 = 1.0;

    /// Resolve the configuration for a run in `work_dir`.
    ///
    /// An explicit path must exist. Otherwise `ose.toml` in the working
    /// directory wins over the user config file, and defaults apply when
    /// neither exists.
    pub fn load(explicit: Option<&Path>, work_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            return Self::load_from_path(path);
        }

        let local = work_dir.join(LOCAL_CONFIG_NAME);
        if local.exists() {
            return Self::load_from_path(&local);
        }

        if let Some(user) = user_config_path()
            && user.exists()
        {
            return Self::load_from_path(&user);
        }

        Ok(Self::default())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;

        emit(
            Level::Debug,
            "config.loaded",
            &format!("Loaded config from {}", path.display()),
            None,
        );
        Ok(config)
    }

    pub fn title_duration(&self) -> f64 {
        sanitize_duration(self.title_duration, Self::DEFAULT_TITLE_DURATION)
    }

    pub fn end_duration(&self) -> f64 {
        sanitize_duration(self.end_duration, Self::DEFAULT_END_DURATION)
    }

    pub fn resources_dir(&self) -> Result<PathBuf> {
        match &self.resources_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_resources_dir(),
        }
    }

    pub fn title_logo(&self) -> Result<PathBuf> {
        Ok(self.resources_dir()?.join(LOGO_WITH_TEXT))
    }

    pub fn end_logo(&self) -> Result<PathBuf> {
        Ok(self.resources_dir()?.join(LOGO))
    }

    pub fn font_file(&self) -> Result<PathBuf> {
        Ok(self.resources_dir()?.join(FONT_FILE))
    }

    /// Logos and font that are not present on disk.
    pub fn missing_resources(&self) -> Result<Vec<PathBuf>> {
        let dir = self.resources_dir()?;
        Ok([LOGO_WITH_TEXT, LOGO, FONT_FILE]
            .iter()
            .map(|name| dir.join(name))
            .filter(|path| !path.is_file())
            .collect())
    }

    /// Fail before any rendering starts when the card assets are missing.
    pub fn ensure_resources(&self) -> Result<()> {
        let missing = self.missing_resources()?;
        if missing.is_empty() {
            return Ok(());
        }

        let lines = missing
            .iter()
            .map(|path| format!("  {}", path.display()))
            .collect::<Vec<_>>()
            .join("\n");
        anyhow::bail!(
            "Missing card resources:\n{}\nCopy {}, {} and {} into {}, or set resources_dir in {}",
            lines,
            LOGO_WITH_TEXT,
            LOGO,
            FONT_FILE,
            self.resources_dir()?.display(),
            LOCAL_CONFIG_NAME
        );
    }
}

fn sanitize_duration(value: f64, default: f64) -> f64 {
    if value.is_finite() && value >= CompileConfig::MIN_CARD_DURATION {
        value
    } else {
        default
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ose").join("config.toml"))
}

fn default_resources_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .context("Could not determine a data directory; set resources_dir in the config")?;
    Ok(data_dir.join("ose").join("resources"))
}
