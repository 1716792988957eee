//! Move top-level source folders under `src/`

use crate::error::{Result, ScaffoldError};
use crate::options::{Mode, TemplateKind};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Top-level folders relocated when a `src/` layout is requested
pub const SRC_DIR_NAMES: [&str; 3] = ["app", "pages", "styles"];

/// Project-relative path of the entry page for a template and mode
pub fn entry_page(template: TemplateKind, mode: Mode) -> PathBuf {
    let (dir, file) = if template.is_app_router() {
        ("app", "page")
    } else {
        ("pages", "index")
    };
    PathBuf::from(dir).join(format!("{file}.{}", mode.page_extension()))
}

/// Point the entry page's "edit this file" hint at its new location
pub fn rewrite_entry_reference(content: &str, template: TemplateKind) -> String {
    let (from, to) = if template.is_app_router() {
        ("app/page", "src/app/page")
    } else {
        ("pages/index", "src/pages/index")
    };
    content.replacen(from, to, 1)
}

/// Create `src/` and move the known source folders into it
///
/// A folder the template does not have is skipped. Any other rename
/// failure is fatal. Returns the names that were moved.
pub async fn move_into_src(
    root: &Path,
    template: TemplateKind,
    mode: Mode,
) -> Result<Vec<&'static str>> {
    let src_dir = root.join("src");
    fs::create_dir_all(&src_dir)
        .await
        .map_err(|source| ScaffoldError::Restructure {
            path: src_dir.clone(),
            source,
        })?;

    let mut moved = Vec::new();
    for name in SRC_DIR_NAMES {
        let from = root.join(name);
        match fs::rename(&from, src_dir.join(name)).await {
            Ok(()) => moved.push(name),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(dir = name, "template has no folder to move");
            }
            Err(source) => return Err(ScaffoldError::Restructure { path: from, source }),
        }
    }

    if !template.is_api() {
        let page = src_dir.join(entry_page(template, mode));
        let content = fs::read_to_string(&page)
            .await
            .map_err(|source| ScaffoldError::Restructure {
                path: page.clone(),
                source,
            })?;
        fs::write(&page, rewrite_entry_reference(&content, template))
            .await
            .map_err(|source| ScaffoldError::Restructure { path: page, source })?;
    }

    debug!(?moved, "moved folders into src/");
    Ok(moved)
}
