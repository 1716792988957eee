//! Saved answers from previous runs

use crate::error::{Result, ScaffoldError};
use crate::options::{Bundler, DEFAULT_IMPORT_ALIAS};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory name under the user's config dir
const CONFIG_DIR_NAME: &str = "better-next-app";
const PREFERENCES_FILE: &str = "preferences.json";

/// Lint/format toolchain choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Linter {
    #[default]
    Eslint,
    Biome,
    None,
}

impl Linter {
    pub fn eslint(&self) -> bool {
        matches!(self, Linter::Eslint)
    }

    pub fn biome(&self) -> bool {
        matches!(self, Linter::Biome)
    }
}

/// Answers persisted between runs
///
/// Missing keys fall back to the recommended defaults, so older files keep
/// loading as fields are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub typescript: bool,
    pub linter: Linter,
    pub tailwind: bool,
    pub src_dir: bool,
    pub import_alias: String,
    pub customize_alias: bool,
    pub empty_template: bool,
    pub react_compiler: bool,
    pub bundler: Bundler,
}

impl Default for Preferences {
    /// The recommended defaults
    fn default() -> Self {
        Self {
            typescript: true,
            linter: Linter::Eslint,
            tailwind: true,
            src_dir: false,
            import_alias: DEFAULT_IMPORT_ALIAS.to_string(),
            customize_alias: false,
            empty_template: false,
            react_compiler: false,
            bundler: Bundler::Turbopack,
        }
    }
}

impl Preferences {
    /// `<config dir>/better-next-app/preferences.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(PREFERENCES_FILE))
    }

    /// Load preferences, returning `None` when nothing has been saved yet
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ScaffoldError::Preferences {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ScaffoldError::Preferences {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            })
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let to_error = |source| ScaffoldError::Preferences {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(to_error)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).await.map_err(to_error)
    }

    pub async fn exists(path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Remove saved preferences; clearing when nothing is saved is not an error
    pub async fn clear(path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ScaffoldError::Preferences {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
