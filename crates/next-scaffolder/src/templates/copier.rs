//! Template file copying with toolchain filtering

use crate::error::{Result, ScaffoldError};
use crate::options::InstallOptions;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Lint config kept only when ESLint is selected
pub const ESLINT_CONFIG: &str = "eslint.config.mjs";
/// Formatter config kept only when Biome is selected
pub const BIOME_CONFIG: &str = "biome.json";
/// Style preprocessor config kept only when Tailwind is selected
pub const POSTCSS_CONFIG: &str = "postcss.config.mjs";

/// Which template files to skip while copying
///
/// Patterns are matched against file names at any depth. A leading `*`
/// is a suffix match, a trailing `*` a prefix match, anything else is exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyRules {
    exclude: Vec<String>,
}

impl CopyRules {
    /// Copy everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Skip the config file of every optional toolchain that is switched off
    pub fn for_options(options: &InstallOptions) -> Self {
        let mut rules = Self::all();
        if !options.eslint {
            rules = rules.excluding(ESLINT_CONFIG);
        }
        if !options.biome {
            rules = rules.excluding(BIOME_CONFIG);
        }
        if !options.tailwind {
            rules = rules.excluding(POSTCSS_CONFIG);
        }
        rules
    }

    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn exclusions(&self) -> &[String] {
        &self.exclude
    }

    fn matches(pattern: &str, filename: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix('*') {
            filename.ends_with(suffix)
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            filename.starts_with(prefix)
        } else {
            filename == pattern
        }
    }

    /// Whether a file with this name should be copied
    pub fn should_copy(&self, filename: &str) -> bool {
        !self
            .exclude
            .iter()
            .any(|pattern| Self::matches(pattern, filename))
    }
}

/// Rename entries that cannot be shipped under their final name
///
/// Packaging drops dotfiles and README files, so templates carry them under
/// stand-in names.
pub fn rename_entry(name: &str) -> &str {
    match name {
        "gitignore" => ".gitignore",
        "README-template.md" => "README.md",
        other => other,
    }
}

/// Map a template-relative path to its project-relative destination
pub fn destination_path(relative: &Path) -> PathBuf {
    relative
        .components()
        .map(|component| match component {
            Component::Normal(name) => match name.to_str() {
                Some(name) => PathBuf::from(rename_entry(name)),
                None => PathBuf::from(name),
            },
            other => PathBuf::from(other.as_os_str()),
        })
        .collect()
}

/// Copy a template directory into `target_dir`, returning the destination paths written
///
/// Directory structure is preserved. Files are copied whole; nothing is
/// rolled back if a later file fails.
pub async fn copy_template(
    template_dir: &Path,
    target_dir: &Path,
    rules: &CopyRules,
) -> Result<Vec<PathBuf>> {
    if !fs::try_exists(template_dir).await.unwrap_or(false) {
        return Err(ScaffoldError::TemplateNotFound {
            path: template_dir.to_path_buf(),
        });
    }

    let mut copied_files = Vec::new();

    for entry in WalkDir::new(template_dir)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ScaffoldError::Copy {
            path: template_dir.to_path_buf(),
            source: io::Error::from(e),
        })?;

        let relative = entry
            .path()
            .strip_prefix(template_dir)
            .unwrap_or_else(|_| entry.path());
        let target_path = target_dir.join(destination_path(relative));

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path)
                .await
                .map_err(|source| ScaffoldError::Copy {
                    path: target_path.clone(),
                    source,
                })?;
            continue;
        }

        let filename = entry.file_name().to_string_lossy();
        if !rules.should_copy(&filename) {
            debug!(file = %relative.display(), "skipping excluded template file");
            continue;
        }

        // Ensure parent directories exist
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| ScaffoldError::Copy {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        fs::copy(entry.path(), &target_path)
            .await
            .map_err(|source| ScaffoldError::Copy {
                path: target_path.clone(),
                source,
            })?;

        copied_files.push(target_path);
    }

    debug!(count = copied_files.len(), "copied template files");
    Ok(copied_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_rules_follow_toolchain_flags() {
        let mut options = InstallOptions::new("my-app", "/tmp/my-app");
        options.eslint = true;

        let rules = CopyRules::for_options(&options);
        assert!(rules.should_copy(ESLINT_CONFIG));
        assert!(!rules.should_copy(BIOME_CONFIG));
        assert!(!rules.should_copy(POSTCSS_CONFIG));
        assert!(rules.should_copy("next.config.ts"));
    }

    #[test]
    fn test_all_toolchains_keep_every_config() {
        let mut options = InstallOptions::new("my-app", "/tmp/my-app");
        options.eslint = true;
        options.biome = true;
        options.tailwind = true;

        assert!(CopyRules::for_options(&options).exclusions().is_empty());
    }

    #[test]
    fn test_wildcard_patterns() {
        let rules = CopyRules::all().excluding("*.log").excluding("tmp-*");
        assert!(!rules.should_copy("debug.log"));
        assert!(!rules.should_copy("tmp-cache"));
        assert!(rules.should_copy("page.tsx"));
    }

    #[test]
    fn test_renames() {
        assert_eq!(rename_entry("gitignore"), ".gitignore");
        assert_eq!(rename_entry("README-template.md"), "README.md");
        assert_eq!(rename_entry("README.md"), "README.md");
        assert_eq!(
            destination_path(Path::new("nested/gitignore")),
            PathBuf::from("nested/.gitignore")
        );
    }

    #[tokio::test]
    async fn test_copy_preserves_structure_and_renames() {
        let template = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        write(template.path(), "gitignore", "/node_modules\n");
        write(template.path(), "README-template.md", "# readme\n");
        write(template.path(), "app/page.tsx", "export default function Home() {}\n");
        write(template.path(), "biome.json", "{}\n");

        let copied = copy_template(
            template.path(),
            project.path(),
            &CopyRules::all().excluding(BIOME_CONFIG),
        )
        .await
        .unwrap();

        assert_eq!(copied.len(), 3);
        assert!(project.path().join(".gitignore").is_file());
        assert!(project.path().join("README.md").is_file());
        assert!(project.path().join("app/page.tsx").is_file());
        assert!(!project.path().join("gitignore").exists());
        assert!(!project.path().join("biome.json").exists());
    }

    #[tokio::test]
    async fn test_missing_template_dir() {
        let project = TempDir::new().unwrap();
        let missing = project.path().join("no-such-template");

        let err = copy_template(&missing, project.path(), &CopyRules::all())
            .await
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::TemplateNotFound { .. }));
    }
}
