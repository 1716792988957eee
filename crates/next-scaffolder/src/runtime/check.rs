//! Environment detection: package managers, connectivity, CI

use crate::options::PackageManager;
use semver::Version;
use std::process::Command;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Registry probed to decide whether installs can hit the network
const REGISTRY_ADDR: &str = "registry.npmjs.org:443";
const ONLINE_TIMEOUT: Duration = Duration::from_secs(3);

/// Environment variables set by common CI providers
const CI_ENV_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "DRONE",
    "TEAMCITY_VERSION",
];

/// Package manager detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

/// Check whether a package manager is installed and which version it reports
pub fn check_package_manager(package_manager: PackageManager) -> RuntimeInfo {
    let name = package_manager.as_str();
    let output = Command::new(name).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                name,
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            name,
            version: None,
            available: false,
        },
    }
}

/// Oldest release that understands the settings written for this package manager
///
/// pnpm 9 still needs the `packages` entry; bun learned `ignoreScripts` in 1.3.2.
pub fn minimum_version(package_manager: PackageManager) -> Option<&'static str> {
    match package_manager {
        PackageManager::Pnpm => Some("9.0.0"),
        PackageManager::Bun => Some("1.3.2"),
        PackageManager::Npm | PackageManager::Yarn => None,
    }
}

/// Warn when the installed package manager predates the generated settings
pub fn check_compatibility(package_manager: PackageManager, installed: &str) -> Option<String> {
    let required = minimum_version(package_manager)?;
    let installed_ver = parse_version(installed)?;
    let required_ver = Version::parse(required).ok()?;

    if installed_ver < required_ver {
        Some(format!(
            "{} {} is older than {}; some generated settings may be ignored",
            package_manager, installed, required
        ))
    } else {
        None
    }
}

/// Parse version output such as `v10.2.0` or `1.3.2\n`
pub fn parse_version(version_str: &str) -> Option<Version> {
    let trimmed = version_str.trim();
    let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(cleaned).ok()
}

/// Infer the package manager that launched us from `npm_config_user_agent`
pub fn package_manager_from_user_agent(user_agent: Option<&str>) -> PackageManager {
    match user_agent {
        Some(agent) if agent.starts_with("pnpm") => PackageManager::Pnpm,
        Some(agent) if agent.starts_with("yarn") => PackageManager::Yarn,
        Some(agent) if agent.starts_with("bun") => PackageManager::Bun,
        _ => PackageManager::Npm,
    }
}

pub fn detect_package_manager() -> PackageManager {
    let agent = std::env::var("npm_config_user_agent").ok();
    package_manager_from_user_agent(agent.as_deref())
}

/// Whether any well-known CI variable is set to something other than `false`
pub fn is_ci_with(lookup: impl Fn(&str) -> Option<String>) -> bool {
    CI_ENV_VARS.iter().any(|var| {
        lookup(var).is_some_and(|value| !value.is_empty() && !value.eq_ignore_ascii_case("false"))
    })
}

pub fn is_ci() -> bool {
    is_ci_with(|var| std::env::var(var).ok())
}

/// Probe the npm registry over TCP
pub async fn is_online() -> bool {
    matches!(
        timeout(ONLINE_TIMEOUT, TcpStream::connect(REGISTRY_ADDR)).await,
        Ok(Ok(_))
    )
}
