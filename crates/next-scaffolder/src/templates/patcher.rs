//! Fixed-anchor patches for generated config files
//!
//! Every shipped template carries the anchors below verbatim. A patch whose
//! anchor is missing is a silent no-op; the template contract tests in
//! `tests/` keep the anchors from drifting.

use crate::error::{Result, ScaffoldError};
use crate::options::{Bundler, Mode, DEFAULT_IMPORT_ALIAS};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Import prepended to the Next config when Rspack is selected
pub const RSPACK_IMPORT: &str = "import withRspack from \"next-rspack\";\n\n";
/// Default export of every template's Next config
pub const EXPORT_ANCHOR: &str = "export default nextConfig;";
/// Replacement export wrapping the config with the Rspack plugin
pub const RSPACK_EXPORT: &str = "export default withRspack(nextConfig);";

/// Placeholder comment inside the Next config object
pub const CONFIG_OPTIONS_ANCHOR: &str = "/* config options here */\n";
/// Placeholder followed by the compiler flag
pub const REACT_COMPILER_OPTION: &str = "/* config options here */\n  reactCompiler: true,\n";

/// Path mapping for the default alias pointing at the project root
pub const ROOT_ALIAS_TARGET: &str = r#""@/*": ["./*"]"#;
/// Path mapping for the default alias pointing at `src/`
pub const SRC_ALIAS_TARGET: &str = r#""@/*": ["./src/*"]"#;
/// Default alias key as it appears in tsconfig/jsconfig
pub const DEFAULT_ALIAS_KEY: &str = r#""@/*":"#;

/// Prepend the Rspack import and wrap the default export
pub fn apply_rspack(content: &str) -> String {
    if !content.contains(EXPORT_ANCHOR) {
        debug!("next config has no default export anchor");
    }
    format!(
        "{RSPACK_IMPORT}{}",
        content.replacen(EXPORT_ANCHOR, RSPACK_EXPORT, 1)
    )
}

/// Enable the React Compiler inside the config object
pub fn apply_react_compiler(content: &str) -> String {
    content.replacen(CONFIG_OPTIONS_ANCHOR, REACT_COMPILER_OPTION, 1)
}

/// Point the default alias at `src/` when requested, then rename its key
///
/// The target switch runs first: it matches on the default key, which the
/// rename would otherwise have already replaced.
pub fn apply_path_alias(content: &str, src_dir: bool, import_alias: &str) -> String {
    let content = if src_dir {
        content.replacen(ROOT_ALIAS_TARGET, SRC_ALIAS_TARGET, 1)
    } else {
        content.to_string()
    };
    if import_alias == DEFAULT_IMPORT_ALIAS {
        return content;
    }
    content.replacen(DEFAULT_ALIAS_KEY, &format!("\"{import_alias}\":"), 1)
}

async fn rewrite_file(path: PathBuf, patch: impl FnOnce(&str) -> String) -> Result<()> {
    let content = fs::read_to_string(&path)
        .await
        .map_err(|source| ScaffoldError::Patch {
            path: path.clone(),
            source,
        })?;
    fs::write(&path, patch(&content))
        .await
        .map_err(|source| ScaffoldError::Patch { path, source })
}

/// Apply bundler and compiler patches to the generated Next config
pub async fn patch_next_config(
    root: &Path,
    mode: Mode,
    bundler: Bundler,
    react_compiler: bool,
) -> Result<()> {
    let config_file = root.join(mode.next_config_file());

    if bundler == Bundler::Rspack {
        debug!(file = %config_file.display(), "wrapping next config with rspack");
        rewrite_file(config_file.clone(), apply_rspack).await?;
    }

    if react_compiler {
        debug!(file = %config_file.display(), "enabling react compiler");
        rewrite_file(config_file, apply_react_compiler).await?;
    }

    Ok(())
}

/// Update the alias target and key in tsconfig.json / jsconfig.json
pub async fn patch_path_alias(
    root: &Path,
    mode: Mode,
    src_dir: bool,
    import_alias: &str,
) -> Result<()> {
    let config_file = root.join(mode.path_config_file());
    debug!(file = %config_file.display(), src_dir, import_alias, "patching path alias");
    rewrite_file(config_file, |content| {
        apply_path_alias(content, src_dir, import_alias)
    })
    .await
}
