//! Next Scaffolder - materializes Next.js projects from bundled templates
//!
//! This library takes a resolved [`InstallOptions`] and turns a template
//! directory into a ready-to-install Next.js project. The CLI binary builds
//! the options (from flags, saved preferences and prompts) and hands them to
//! a [`Scaffolder`].
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - template location, filtered copying, config
//!   patching, import-alias rewriting, `src/` restructuring, manifest synthesis
//! - **Layer 2: Workflow Orchestration** - [`Scaffolder`] runs the steps in order
//!   and hands off to a [`PackageManagerRunner`] for install and typegen
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use next_scaffolder::{CommandRunner, InstallOptions, Overrides, Scaffolder, TemplateLocator};
//!
//! let options = InstallOptions::new("my-app", "/tmp/my-app");
//! let scaffolder = Scaffolder::new(
//!     TemplateLocator::from_env(),
//!     Overrides::from_env(),
//!     CommandRunner::new(&options.root),
//! );
//! let report = scaffolder.install(&options).await?;
//! ```

pub mod config;
pub mod error;
pub mod options;
pub mod runtime;
pub mod scaffold;
pub mod templates;
pub mod validate;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{Overrides, Preferences};
pub use error::{Result, ScaffoldError};
pub use options::{Bundler, InstallOptions, Mode, PackageManager, TemplateKind, DEFAULT_IMPORT_ALIAS};
pub use runtime::{CommandRunner, PackageManagerRunner};
pub use scaffold::{InstallReport, Scaffolder};
pub use templates::{PackageManifest, TemplateLocator};

#[cfg(feature = "tui")]
pub use tui::run;

/// Release version of this tool. Generated manifests pin `next` to it unless overridden.
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
