//! Template location, copying, and post-copy adaptation
//!
//! This module provides:
//! - Template directory resolution (TemplateLocator)
//! - Filtered copying with dotfile/README renames
//! - Next config and path-alias config patching
//! - Concurrent import-alias rewriting
//! - `src/` directory restructuring
//! - package.json synthesis

pub mod alias;
pub mod copier;
pub mod locator;
pub mod manifest;
pub mod patcher;
pub mod restructure;

pub use alias::rewrite_import_aliases;
pub use copier::{copy_template, CopyRules};
pub use locator::TemplateLocator;
pub use manifest::{PackageManifest, Scripts};
pub use restructure::{move_into_src, SRC_DIR_NAMES};
