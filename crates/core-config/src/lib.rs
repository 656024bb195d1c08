//! Configuration loading and parsing.
//!
//! Parses `rvi.toml` (or an override path provided by the binary). Every table and field is
//! optional; anything absent takes its default. Unknown fields are ignored so older binaries
//! tolerate newer files. An unparsable file is reported at `warn` and the defaults are used:
//! a broken config never prevents the editor from starting.
//!
//! ```toml
//! [editor]
//! expandtab = true
//! tabstop = 4
//! [view]
//! line_numbers = false
//! [status]
//! flash_ms = 3000
//! [recovery]
//! path = "before_crash_text"
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "rvi.toml";
pub const DEFAULT_RECOVERY_PATH: &str = "before_crash_text";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_expandtab")]
    pub expandtab: bool,
    #[serde(default = "EditorConfig::default_tabstop")]
    pub tabstop: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            expandtab: Self::default_expandtab(),
            tabstop: Self::default_tabstop(),
        }
    }
}

impl EditorConfig {
    const fn default_expandtab() -> bool {
        true
    }
    const fn default_tabstop() -> usize {
        4
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    #[serde(default)]
    pub line_numbers: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StatusConfig {
    #[serde(default = "StatusConfig::default_flash_ms")]
    pub flash_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            flash_ms: Self::default_flash_ms(),
        }
    }
}

impl StatusConfig {
    const fn default_flash_ms() -> u64 {
        3000
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RecoveryConfig {
    #[serde(default = "RecoveryConfig::default_path")]
    pub path: PathBuf,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

impl RecoveryConfig {
    fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_RECOVERY_PATH)
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub source: Option<PathBuf>,
}

/// Best-effort config path: local working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("rvi").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config loaded");
            let mut cfg = Config {
                raw: Some(content),
                file,
                source: Some(path),
            };
            cfg.normalize();
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Clamp values the editor cannot honor.
    fn normalize(&mut self) {
        if self.file.editor.tabstop == 0 {
            info!(target: "config", "tabstop_zero_clamped");
            self.file.editor.tabstop = 1;
        }
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.file.status.flash_ms)
    }
}
