//! Option model consumed by the scaffolder

use crate::error::ScaffoldError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Import alias configured by every shipped template
pub const DEFAULT_IMPORT_ALIAS: &str = "@/*";

/// Package manager used to install the generated project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    /// Command that runs a package.json script, e.g. `npm run dev`
    pub fn run_script(&self, script: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm run {script}"),
            other => format!("{} {script}", other.as_str()),
        }
    }
}

/// Language variant of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Ts,
    Js,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Ts => "ts",
            Mode::Js => "js",
        }
    }

    /// File name of the Next.js config shipped with this mode
    pub fn next_config_file(&self) -> &'static str {
        match self {
            Mode::Ts => "next.config.ts",
            Mode::Js => "next.config.mjs",
        }
    }

    /// File name of the compiler config that carries the path alias
    pub fn path_config_file(&self) -> &'static str {
        match self {
            Mode::Ts => "tsconfig.json",
            Mode::Js => "jsconfig.json",
        }
    }

    /// Extension used by page components
    pub fn page_extension(&self) -> &'static str {
        match self {
            Mode::Ts => "tsx",
            Mode::Js => "js",
        }
    }
}

/// Build tool wired into the generated scripts and config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Bundler {
    #[default]
    Turbopack,
    Webpack,
    Rspack,
}

impl Bundler {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bundler::Turbopack => "turbopack",
            Bundler::Webpack => "webpack",
            Bundler::Rspack => "rspack",
        }
    }
}

/// Project starter variants shipped under `templates/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum TemplateKind {
    #[default]
    #[serde(rename = "app")]
    #[value(name = "app")]
    App,
    #[serde(rename = "app-empty")]
    #[value(name = "app-empty")]
    AppEmpty,
    #[serde(rename = "app-tw")]
    #[value(name = "app-tw")]
    AppTw,
    #[serde(rename = "app-tw-empty")]
    #[value(name = "app-tw-empty")]
    AppTwEmpty,
    #[serde(rename = "app-api")]
    #[value(name = "app-api")]
    AppApi,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::App,
        TemplateKind::AppEmpty,
        TemplateKind::AppTw,
        TemplateKind::AppTwEmpty,
        TemplateKind::AppApi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::App => "app",
            TemplateKind::AppEmpty => "app-empty",
            TemplateKind::AppTw => "app-tw",
            TemplateKind::AppTwEmpty => "app-tw-empty",
            TemplateKind::AppApi => "app-api",
        }
    }

    /// Pick the starter matching the user's choices
    pub fn select(api: bool, tailwind: bool, empty: bool) -> Self {
        match (api, tailwind, empty) {
            (true, _, _) => TemplateKind::AppApi,
            (false, true, true) => TemplateKind::AppTwEmpty,
            (false, true, false) => TemplateKind::AppTw,
            (false, false, true) => TemplateKind::AppEmpty,
            (false, false, false) => TemplateKind::App,
        }
    }

    /// API-only starters ship route handlers and no React pages
    pub fn is_api(&self) -> bool {
        matches!(self, TemplateKind::AppApi)
    }

    /// App Router starters are the ones whose name begins with `app`
    pub fn is_app_router(&self) -> bool {
        self.as_str().starts_with("app")
    }
}

macro_rules! display_and_parse {
    ($ty:ty, $name:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ScaffoldError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as ValueEnum>::from_str(s, true).map_err(|_| ScaffoldError::InvalidOption {
                    name: $name,
                    value: s.to_string(),
                })
            }
        }
    };
}

display_and_parse!(PackageManager, "package manager");
display_and_parse!(Mode, "mode");
display_and_parse!(Bundler, "bundler");
display_and_parse!(TemplateKind, "template");

/// Everything the scaffolder needs to know about the project being created
///
/// Built once by the CLI layer; the scaffolder never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallOptions {
    pub app_name: String,
    /// Absolute path of an existing, writable directory
    pub root: PathBuf,
    pub package_manager: PackageManager,
    pub is_online: bool,
    pub template: TemplateKind,
    pub mode: Mode,
    pub tailwind: bool,
    pub eslint: bool,
    pub biome: bool,
    pub src_dir: bool,
    pub skip_install: bool,
    pub react_compiler: bool,
    /// Path-mapping pattern ending in `/*`
    pub import_alias: String,
    pub bundler: Bundler,
}

impl InstallOptions {
    /// Options for a TypeScript App Router project with every toolchain off
    pub fn new(app_name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            app_name: app_name.into(),
            root: root.into(),
            package_manager: PackageManager::default(),
            is_online: true,
            template: TemplateKind::default(),
            mode: Mode::default(),
            tailwind: false,
            eslint: false,
            biome: false,
            src_dir: false,
            skip_install: false,
            react_compiler: false,
            import_alias: DEFAULT_IMPORT_ALIAS.to_string(),
            bundler: Bundler::default(),
        }
    }

    pub fn uses_default_alias(&self) -> bool {
        self.import_alias == DEFAULT_IMPORT_ALIAS
    }
}
