//! Input validation performed before any file is written

use std::io;
use std::path::Path;
use url::form_urlencoded;

const MAX_NAME_LENGTH: usize = 214;

/// Node.js core modules and names npm reserves
const RESERVED_NAMES: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "dns", "domain", "events", "favicon.ico", "fs", "http", "https",
    "inspector", "module", "net", "node_modules", "os", "path", "perf_hooks", "process",
    "punycode", "querystring", "readline", "repl", "stream", "string_decoder", "timers",
    "tls", "trace_events", "tty", "url", "util", "v8", "vm", "worker_threads", "zlib",
];

/// Entries that may already exist in a target directory
const ALLOWED_EXISTING: &[&str] = &[
    ".DS_Store",
    ".git",
    ".gitattributes",
    ".gitignore",
    ".gitkeep",
    ".gitlab-ci.yml",
    ".hg",
    ".hgcheck",
    ".hgignore",
    ".idea",
    ".npmignore",
    ".travis.yml",
    "LICENSE",
    "license",
    "Thumbs.db",
    "docs",
    "mkdocs.yml",
    "npm-debug.log",
    "yarn-debug.log",
    "yarn-error.log",
    "yarnrc.yml",
    ".yarn",
    "README.md",
    "readme.md",
];

/// Package-manager debug logs, including rotations such as `npm-debug.log.1`
const LOG_PREFIXES: &[&str] = &[
    "npm-debug.log",
    "yarn-debug.log",
    "yarn-error.log",
    ".yarn-integrity",
];

/// Outcome of checking a name against npm's package naming rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameValidation {
    pub valid_for_new_packages: bool,
    pub valid_for_old_packages: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl NameValidation {
    /// All problems, errors first
    pub fn problems(&self) -> Vec<String> {
        self.errors.iter().chain(&self.warnings).cloned().collect()
    }
}

fn is_url_safe(name: &str) -> bool {
    form_urlencoded::byte_serialize(name.as_bytes()).collect::<String>() == name
}

/// Validate a project name with npm's package naming rules
pub fn validate_npm_name(name: &str) -> NameValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if name.is_empty() {
        errors.push("name length must be greater than zero".to_string());
        return NameValidation {
            errors,
            ..NameValidation::default()
        };
    }

    if name.starts_with('.') {
        errors.push("name cannot start with a period".to_string());
    }
    if name.starts_with('_') {
        errors.push("name cannot start with an underscore".to_string());
    }
    if name.trim() != name {
        errors.push("name cannot contain leading or trailing spaces".to_string());
    }

    let scoped = name.strip_prefix('@').map(|rest| rest.split_once('/'));
    let package_name = match scoped {
        Some(Some((scope, package))) => {
            if scope.is_empty() {
                errors.push("scope name cannot be empty".to_string());
            }
            if package.is_empty() {
                errors.push("package name after scope cannot be empty".to_string());
            }
            if !is_url_safe(scope) || !is_url_safe(package) {
                errors.push("name can only contain URL-friendly characters".to_string());
            }
            package
        }
        Some(None) => {
            errors.push("scoped package name must include a package name after the scope".to_string());
            name
        }
        None => {
            if !is_url_safe(name) {
                errors.push("name can only contain URL-friendly characters".to_string());
            }
            name
        }
    };

    if RESERVED_NAMES.contains(&package_name.to_lowercase().as_str()) {
        errors.push(format!("{package_name} is a core module or reserved name"));
    }

    if name.len() > MAX_NAME_LENGTH {
        warnings.push("name can no longer contain more than 214 characters".to_string());
    }
    if name.to_lowercase() != name {
        warnings.push("name can no longer contain capital letters".to_string());
    }
    if name.contains(['~', '\'', '!', '(', ')', '*']) {
        warnings.push(r#"name can no longer contain special characters ("~\'!()*")"#.to_string());
    }

    NameValidation {
        valid_for_new_packages: errors.is_empty() && warnings.is_empty(),
        valid_for_old_packages: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Check an import alias is a `<prefix>/*` pattern
pub fn validate_import_alias(alias: &str) -> Result<(), String> {
    if !alias.ends_with("/*") {
        return Err("import alias must follow the pattern <prefix>/*".to_string());
    }
    if alias.len() == 2 || alias.chars().any(char::is_whitespace) {
        return Err("import alias needs a non-empty prefix without spaces".to_string());
    }
    Ok(())
}

/// Entries in `dir` that would clash with generated files
///
/// A missing directory has no conflicts. Log files left by package managers
/// are tolerated.
pub fn conflicting_files(dir: &Path) -> io::Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut conflicts = Vec::new();
    for entry in entries {
        let name = entry?.file_name().to_string_lossy().into_owned();
        let is_log = name.ends_with(".log")
            || LOG_PREFIXES.iter().any(|prefix| name.starts_with(prefix));
        if !ALLOWED_EXISTING.contains(&name.as_str()) && !is_log {
            conflicts.push(name);
        }
    }
    conflicts.sort();
    Ok(conflicts)
}

/// Fail unless a file can be created inside `dir`
pub fn ensure_writable(dir: &Path) -> io::Result<()> {
    let probe = dir.join(".better-next-app-write-test");
    std::fs::write(&probe, b"")?;
    std::fs::remove_file(&probe)
}
