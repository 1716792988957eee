//! Resolve a template name and mode to its source directory

use crate::options::{Mode, TemplateKind};
use std::path::{Path, PathBuf};

/// Environment variable for overriding the template root
pub const TEMPLATE_DIR_ENV: &str = "BETTER_NEXT_APP_TEMPLATE_DIR";

/// Templates shipped alongside the workspace
const BUNDLED_TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../templates");

/// Maps `(template, mode)` to `<root>/<template>/<mode>`
///
/// No I/O happens here: a missing directory only surfaces when the copier
/// walks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLocator {
    root: PathBuf,
}

impl TemplateLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Templates bundled with this workspace
    pub fn bundled() -> Self {
        Self::new(BUNDLED_TEMPLATE_DIR)
    }

    /// Honor the override variable, falling back to the bundled templates
    pub fn from_env() -> Self {
        match std::env::var_os(TEMPLATE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::bundled(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn template_dir(&self, template: TemplateKind, mode: Mode) -> PathBuf {
        self.root.join(template.as_str()).join(mode.as_str())
    }

    /// Path of a single file inside a template, e.g. `next.config.ts`
    pub fn template_file(&self, template: TemplateKind, mode: Mode, file: &str) -> PathBuf {
        self.template_dir(template, mode).join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_dir_layout() {
        let locator = TemplateLocator::new("/opt/templates");
        assert_eq!(
            locator.template_dir(TemplateKind::AppTw, Mode::Js),
            PathBuf::from("/opt/templates/app-tw/js")
        );
        assert_eq!(
            locator.template_file(TemplateKind::AppApi, Mode::Ts, "app/route.ts"),
            PathBuf::from("/opt/templates/app-api/ts/app/route.ts")
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let locator = TemplateLocator::new("/opt/templates");
        for template in TemplateKind::ALL {
            for mode in [Mode::Ts, Mode::Js] {
                let first = locator.template_dir(template, mode);
                let second = locator.template_dir(template, mode);
                assert_eq!(first, second);
                assert!(first.ends_with(Path::new(template.as_str()).join(mode.as_str())));
            }
        }
    }

    #[test]
    fn test_missing_root_is_not_checked() {
        let locator = TemplateLocator::new("/definitely/not/here");
        let dir = locator.template_dir(TemplateKind::App, Mode::Ts);
        assert!(!dir.exists());
    }
}
