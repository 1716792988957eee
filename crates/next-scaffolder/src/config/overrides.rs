//! Release-version overrides, read once at the process boundary

use std::path::{Component, Path, PathBuf};

/// Environment variable that pins the `next` version (or a local package path)
pub const TEST_VERSION_ENV: &str = "NEXT_PRIVATE_TEST_VERSION";

/// Packed Rspack plugin location, relative to the directory of the local `next` package
const RSPACK_PACKED: &str = "../next-rspack/next-rspack-packed.tgz";

/// Version inputs for manifest synthesis
///
/// Built once, either from the environment with [`Overrides::from_env`] or
/// explicitly in tests, and passed into the manifest builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overrides {
    /// Version constraint (or local tarball path) written for `next`
    pub next_version: String,
    /// Local tarball used for `next-rspack` instead of `next_version`
    pub rspack_package: Option<String>,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            next_version: crate::CLI_VERSION.to_string(),
            rspack_package: None,
        }
    }
}

impl Overrides {
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(TEST_VERSION_ENV).ok())
    }

    /// Interpret a raw override value
    ///
    /// Any non-empty value replaces the release version. An absolute path also
    /// redirects `next-rspack` to the packed plugin next to it.
    pub fn from_value(value: Option<String>) -> Self {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return Self::default();
        };

        let path = Path::new(&value);
        let rspack_package = path.is_absolute().then(|| {
            let dir = path.parent().unwrap_or(path);
            normalize(&dir.join(RSPACK_PACKED))
                .to_string_lossy()
                .into_owned()
        });

        Self {
            next_version: value,
            rspack_package,
        }
    }

    /// Version to use for the Rspack plugin dependency
    pub fn rspack_version(&self) -> &str {
        self.rspack_package.as_deref().unwrap_or(&self.next_version)
    }
}

/// Resolve `.` and `..` lexically without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_release_version() {
        let overrides = Overrides::from_value(None);
        assert_eq!(overrides.next_version, crate::CLI_VERSION);
        assert_eq!(overrides.rspack_version(), crate::CLI_VERSION);
    }

    #[test]
    fn test_empty_value_ignored() {
        assert_eq!(Overrides::from_value(Some(String::new())), Overrides::default());
    }

    #[test]
    fn test_version_override() {
        let overrides = Overrides::from_value(Some("canary".to_string()));
        assert_eq!(overrides.next_version, "canary");
        assert_eq!(overrides.rspack_package, None);
        assert_eq!(overrides.rspack_version(), "canary");
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_path_points_rspack_at_packed_tarball() {
        let overrides =
            Overrides::from_value(Some("/repo/packages/next/next-packed.tgz".to_string()));
        assert_eq!(overrides.next_version, "/repo/packages/next/next-packed.tgz");
        assert_eq!(
            overrides.rspack_package.as_deref(),
            Some("/repo/packages/next-rspack/next-rspack-packed.tgz")
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
    }
}
