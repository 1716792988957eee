//! Error taxonomy for project scaffolding

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the library
pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// Errors raised while materializing a project
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("template directory not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("failed to copy template files to {}: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to patch {}: {source}", path.display())]
    Patch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to update import aliases in {}: {source}", path.display())]
    AliasRewrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {} into src/: {source}", path.display())]
    Restructure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize package.json: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to read preferences at {}: {source}", path.display())]
    Preferences {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid {name}: '{value}'")]
    InvalidOption { name: &'static str, value: String },

    #[error("failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {}", code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("concurrency limit unavailable: {0}")]
    Concurrency(#[from] tokio::sync::AcquireError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
