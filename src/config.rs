use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Points at an optional TOML file overriding the defaults below.
pub const CONFIG_ENV: &str = "CHAPTER_EDIT_CONFIG";
pub const EDITOR_ENV: &str = "EDITOR";
pub const DEFAULT_EDITOR: &str = "vim";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ffprobe: PathBuf,
    pub ffmpeg: PathBuf,
    /// Editor command line, split on whitespace.
    pub editor: String,
    /// Title of the chapter created when a file has none. Empty disables it.
    pub automatic_chapter: String,
    /// Denominator of the timebase written back to the file.
    pub timebase: u64,
    /// Write the file-level tags back alongside the chapters.
    pub keep_global_metadata: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ffprobe: PathBuf::from("ffprobe"),
            ffmpeg: PathBuf::from("ffmpeg"),
            editor: DEFAULT_EDITOR.to_string(),
            automatic_chapter: "Intro".to_string(),
            timebase: 1000,
            keep_global_metadata: true,
        }
    }
}

impl Config {
    /// Defaults, then the file named by `CHAPTER_EDIT_CONFIG`, then `EDITOR`.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let editor = std::env::var(EDITOR_ENV).ok();
        Self::layered(config_path.as_deref(), editor.as_deref())
    }

    /// Same layering as [`Config::load`] with the environment passed in. A blank
    /// editor is ignored.
    pub fn layered(config_path: Option<&Path>, editor: Option<&str>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(editor) = editor.filter(|e| !e.trim().is_empty()) {
            config.editor = editor.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timebase == 0 {
            anyhow::bail!("timebase must be greater than zero");
        }
        if self.editor.split_whitespace().next().is_none() {
            anyhow::bail!("editor command is empty");
        }
        Ok(())
    }

    pub fn automatic_chapter(&self) -> Option<&str> {
        let title = self.automatic_chapter.trim();
        (!title.is_empty()).then_some(title)
    }
}
