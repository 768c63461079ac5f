//! `pgrid.toml` settings.
//!
//! Looked up in the platform configuration folder unless `--settings` names
//! a file:
//! - macOS: ~/Library/Application Support/com.profesto.pgrid/
//! - Windows: %APPDATA%/profesto/pgrid/config/
//! - Linux: ~/.config/pgrid/

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "profesto";
const APP_NAME: &str = "pgrid";
const SETTINGS_FILENAME: &str = "pgrid.toml";
const STATE_DIRNAME: &str = "grid-state";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Folder holding persisted view state, one JSON file per grid.
    pub store_dir: Option<PathBuf>,
    /// Folder exported workbooks are written to.
    pub export_dir: Option<PathBuf>,
    /// Report name used in export file names when the command gives none.
    pub report_name: Option<String>,
    pub sheet_name: Option<String>,
}

impl Settings {
    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(STATE_DIRNAME)))
            .unwrap_or_else(|| PathBuf::from(".pgrid").join(STATE_DIRNAME))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

pub fn settings_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILENAME))
}

/// Load settings, falling back to defaults when the file is missing or invalid.
pub fn load_settings(explicit: Option<&Path>) -> Settings {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(settings_path) else {
        warn!("could not determine settings path, using defaults");
        return Settings::default();
    };
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                info!(path = %path.display(), "settings loaded");
                settings
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "invalid settings file, using defaults");
                Settings::default()
            }
        },
        Err(error) if error.kind() == ErrorKind::NotFound => Settings::default(),
        Err(error) => {
            warn!(path = %path.display(), %error, "could not read settings file, using defaults");
            Settings::default()
        }
    }
}
