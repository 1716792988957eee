//! package.json synthesis and package-manager side files

use crate::config::Overrides;
use crate::error::{Result, ScaffoldError};
use crate::options::{Bundler, InstallOptions, Mode, PackageManager};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// React version pinned as the Next.js peer dependency
pub const REACT_PEER_VERSION: &str = "19.2.3";

/// Version every generated project starts at
pub const PROJECT_VERSION: &str = "0.1.0";

/// Packages with install scripts the package managers should not run
pub const IGNORED_BUILD_DEPENDENCIES: [&str; 2] = ["sharp", "unrs-resolver"];

pub const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Scripts section, serialized in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scripts {
    pub dev: String,
    pub build: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// The generated package descriptor
///
/// Dependency maps are ordered maps, so keys are unique and written in
/// alphabetical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub private: bool,
    pub scripts: Scripts,
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_scripts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_dependencies: Option<Vec<String>>,
}

fn insert(map: &mut BTreeMap<String, String>, name: &str, version: &str) {
    map.insert(name.to_string(), version.to_string());
}

impl PackageManifest {
    /// Build the manifest for a set of options
    pub fn build(options: &InstallOptions, overrides: &Overrides) -> Self {
        let version = overrides.next_version.as_str();
        let is_api = options.template.is_api();
        let bundler_flags = if options.bundler == Bundler::Webpack {
            " --webpack"
        } else {
            ""
        };

        let mut scripts = Scripts {
            dev: format!("next dev{bundler_flags}"),
            build: format!("next build{bundler_flags}"),
            start: "next start".to_string(),
            lint: None,
            format: None,
        };
        // API-only projects get no lint/format scripts
        if !is_api {
            if options.eslint {
                scripts.lint = Some("eslint".to_string());
            }
            if options.biome {
                scripts.lint = Some("biome check".to_string());
                scripts.format = Some("biome format --write".to_string());
            }
        }

        let mut dependencies = BTreeMap::new();
        insert(&mut dependencies, "next", version);
        if !is_api {
            insert(&mut dependencies, "react", REACT_PEER_VERSION);
            insert(&mut dependencies, "react-dom", REACT_PEER_VERSION);
        }
        if options.bundler == Bundler::Rspack {
            insert(&mut dependencies, "next-rspack", overrides.rspack_version());
        }

        let mut dev_dependencies = BTreeMap::new();
        if options.react_compiler {
            insert(&mut dev_dependencies, "babel-plugin-react-compiler", "1.0.0");
        }
        if options.mode == Mode::Ts {
            insert(&mut dev_dependencies, "typescript", "^5");
            insert(&mut dev_dependencies, "@types/node", "^20");
            insert(&mut dev_dependencies, "@types/react", "^19");
            // Route type definitions still reference @types/react in API projects
            if !is_api {
                insert(&mut dev_dependencies, "@types/react-dom", "^19");
            }
        }
        if options.tailwind {
            insert(&mut dev_dependencies, "@tailwindcss/postcss", "^4");
            insert(&mut dev_dependencies, "tailwindcss", "^4");
        }
        if options.eslint {
            insert(&mut dev_dependencies, "eslint", "^9");
            insert(&mut dev_dependencies, "eslint-config-next", version);
        }
        if options.biome {
            insert(&mut dev_dependencies, "@biomejs/biome", "2.2.0");
        }

        let ignored = || {
            IGNORED_BUILD_DEPENDENCIES
                .iter()
                .map(|name| name.to_string())
                .collect::<Vec<_>>()
        };
        let (ignore_scripts, trusted_dependencies) = match options.package_manager {
            // Bun needs a package in both lists to silence the postinstall warning
            PackageManager::Bun => (Some(ignored()), Some(ignored())),
            _ => (None, None),
        };

        Self {
            name: options.app_name.clone(),
            version: PROJECT_VERSION.to_string(),
            private: true,
            scripts,
            dependencies,
            dev_dependencies,
            ignore_scripts,
            trusted_dependencies,
        }
    }

    /// Two-space indented JSON with a trailing platform newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push_str(LINE_ENDING);
        Ok(json)
    }

    /// Write `package.json` into `root`
    pub async fn write(&self, root: &Path) -> Result<PathBuf> {
        let path = root.join("package.json");
        let json = self.to_json()?;
        fs::write(&path, json)
            .await
            .map_err(|source| ScaffoldError::Manifest {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "wrote package.json");
        Ok(path)
    }
}

/// Contents of `pnpm-workspace.yaml`
///
/// `packages` keeps pnpm 9 treating the project as a single-package
/// workspace; `ignoredBuiltDependencies` silences pnpm 10 build warnings for
/// packages that ship prebuilt binaries.
pub fn pnpm_workspace_yaml() -> String {
    let mut lines: Vec<String> = ["packages:", "  - .", "ignoredBuiltDependencies:"]
        .iter()
        .map(|line| line.to_string())
        .collect();
    lines.extend(
        IGNORED_BUILD_DEPENDENCIES
            .iter()
            .map(|name| format!("  - {name}")),
    );
    lines.push(String::new());
    lines.join(LINE_ENDING)
}

/// Write files a package manager needs beyond package.json
///
/// Returns the path written, if any.
pub async fn write_package_manager_files(
    root: &Path,
    package_manager: PackageManager,
) -> Result<Option<PathBuf>> {
    if package_manager != PackageManager::Pnpm {
        return Ok(None);
    }

    let path = root.join(PNPM_WORKSPACE_FILE);
    fs::write(&path, pnpm_workspace_yaml())
        .await
        .map_err(|source| ScaffoldError::Manifest {
            path: path.clone(),
            source,
        })?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TemplateKind;
    use tempfile::TempDir;

    fn options() -> InstallOptions {
        InstallOptions::new("my-app", "/tmp/my-app")
    }

    fn overrides() -> Overrides {
        Overrides::from_value(Some("16.0.0".to_string()))
    }

    fn is_sorted(keys: Vec<&String>) -> bool {
        keys.windows(2).all(|pair| pair[0] < pair[1])
    }

    #[test]
    fn test_default_manifest() {
        let manifest = PackageManifest::build(&options(), &overrides());

        assert_eq!(manifest.version, PROJECT_VERSION);
        assert!(manifest.private);
        assert_eq!(manifest.scripts.dev, "next dev");
        assert_eq!(manifest.scripts.lint, None);
        assert_eq!(manifest.dependencies["next"], "16.0.0");
        assert_eq!(manifest.dependencies["react"], REACT_PEER_VERSION);
        assert_eq!(manifest.dev_dependencies["typescript"], "^5");
        assert!(manifest.ignore_scripts.is_none());
    }

    #[test]
    fn test_webpack_flag_on_dev_and_build() {
        let mut opts = options();
        opts.bundler = Bundler::Webpack;
        let manifest = PackageManifest::build(&opts, &overrides());

        assert_eq!(manifest.scripts.dev, "next dev --webpack");
        assert_eq!(manifest.scripts.build, "next build --webpack");
        assert_eq!(manifest.scripts.start, "next start");
    }

    #[test]
    fn test_rspack_dependency_uses_local_package() {
        let mut opts = options();
        opts.bundler = Bundler::Rspack;
        let local = Overrides {
            next_version: "/repo/next/next-packed.tgz".to_string(),
            rspack_package: Some("/repo/next-rspack/next-rspack-packed.tgz".to_string()),
        };

        let manifest = PackageManifest::build(&opts, &local);
        assert_eq!(
            manifest.dependencies["next-rspack"],
            "/repo/next-rspack/next-rspack-packed.tgz"
        );

        let manifest = PackageManifest::build(&opts, &overrides());
        assert_eq!(manifest.dependencies["next-rspack"], "16.0.0");
    }

    #[test]
    fn test_biome_overrides_eslint_script() {
        let mut opts = options();
        opts.eslint = true;
        opts.biome = true;
        let manifest = PackageManifest::build(&opts, &overrides());

        assert_eq!(manifest.scripts.lint.as_deref(), Some("biome check"));
        assert_eq!(manifest.scripts.format.as_deref(), Some("biome format --write"));
        assert!(manifest.dev_dependencies.contains_key("eslint"));
        assert!(manifest.dev_dependencies.contains_key("@biomejs/biome"));
    }

    #[test]
    fn test_api_template_drops_react_and_lint() {
        let mut opts = options();
        opts.template = TemplateKind::AppApi;
        opts.eslint = true;
        opts.biome = true;
        let manifest = PackageManifest::build(&opts, &overrides());

        assert!(!manifest.dependencies.contains_key("react"));
        assert!(!manifest.dependencies.contains_key("react-dom"));
        assert!(!manifest.dev_dependencies.contains_key("@types/react-dom"));
        assert!(manifest.dev_dependencies.contains_key("@types/react"));
        assert_eq!(manifest.scripts.lint, None);
        assert_eq!(manifest.scripts.format, None);
    }

    #[test]
    fn test_js_without_toolchains_omits_dev_dependencies() {
        let mut opts = options();
        opts.mode = Mode::Js;
        let manifest = PackageManifest::build(&opts, &overrides());

        let json = manifest.to_json().unwrap();
        assert!(!json.contains("devDependencies"));
        assert!(json.ends_with(LINE_ENDING));
    }

    #[test]
    fn test_dependency_keys_sorted_for_every_combination() {
        for bits in 0u32..128 {
            let mut opts = options();
            opts.mode = if bits & 1 == 0 { Mode::Ts } else { Mode::Js };
            opts.tailwind = bits & 2 != 0;
            opts.eslint = bits & 4 != 0;
            opts.biome = bits & 8 != 0;
            opts.react_compiler = bits & 16 != 0;
            opts.bundler = if bits & 32 != 0 { Bundler::Rspack } else { Bundler::Turbopack };
            opts.template = if bits & 64 != 0 { TemplateKind::AppApi } else { TemplateKind::App };

            let manifest = PackageManifest::build(&opts, &overrides());
            let json = manifest.to_json().unwrap();

            for map in [&manifest.dependencies, &manifest.dev_dependencies] {
                let keys: Vec<&String> = map.keys().collect();
                assert!(is_sorted(keys.clone()), "keys unsorted for bits {bits:#b}");

                // Serialized order must match the sorted order
                let positions: Vec<usize> = keys
                    .iter()
                    .map(|key| json.find(&format!("\"{key}\":")).unwrap())
                    .collect();
                assert!(positions.windows(2).all(|p| p[0] < p[1]), "bits {bits:#b}");
            }
        }
    }

    #[test]
    fn test_json_field_order() {
        let mut opts = options();
        opts.package_manager = PackageManager::Bun;
        let json = PackageManifest::build(&opts, &overrides()).to_json().unwrap();

        let position = |key: &str| json.find(&format!("\"{key}\"")).unwrap();
        assert!(position("name") < position("scripts"));
        assert!(position("scripts") < position("dependencies"));
        assert!(position("devDependencies") < position("ignoreScripts"));
        assert!(position("ignoreScripts") < position("trustedDependencies"));
        assert!(json.starts_with("{\n  \"name\": \"my-app\""));
    }

    #[test]
    fn test_bun_fields() {
        let mut opts = options();
        opts.package_manager = PackageManager::Bun;
        let manifest = PackageManifest::build(&opts, &overrides());

        let expected = vec!["sharp".to_string(), "unrs-resolver".to_string()];
        assert_eq!(manifest.ignore_scripts.as_ref(), Some(&expected));
        assert_eq!(manifest.trusted_dependencies.as_ref(), Some(&expected));
    }

    #[test]
    fn test_pnpm_workspace_shape() {
        let yaml = pnpm_workspace_yaml();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed["packages"][0].as_str(), Some("."));
        assert_eq!(parsed["ignoredBuiltDependencies"][0].as_str(), Some("sharp"));
        assert_eq!(parsed["ignoredBuiltDependencies"][1].as_str(), Some("unrs-resolver"));
        assert!(yaml.ends_with(LINE_ENDING));
    }

    #[tokio::test]
    async fn test_workspace_file_only_for_pnpm() {
        let dir = TempDir::new().unwrap();

        for pm in [PackageManager::Npm, PackageManager::Yarn, PackageManager::Bun] {
            assert!(write_package_manager_files(dir.path(), pm).await.unwrap().is_none());
        }
        assert!(!dir.path().join(PNPM_WORKSPACE_FILE).exists());

        let written = write_package_manager_files(dir.path(), PackageManager::Pnpm)
            .await
            .unwrap();
        assert_eq!(written, Some(dir.path().join(PNPM_WORKSPACE_FILE)));
    }

    #[tokio::test]
    async fn test_write_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest = PackageManifest::build(&options(), &overrides());

        let path = manifest.write(dir.path()).await.unwrap();
        let read: PackageManifest =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(read, manifest);
    }
}
