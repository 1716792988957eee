//! Package-manager invocations: dependency install and route type generation

use crate::error::{Result, ScaffoldError};
use crate::options::PackageManager;
use async_trait::async_trait;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use tracing::debug;

/// The two external steps run after the project files are written
///
/// The scaffolder only reacts to success or failure; how the package
/// manager is driven is up to the implementation.
#[async_trait]
pub trait PackageManagerRunner: Send + Sync {
    /// Install dependencies declared in the generated package.json
    async fn install(&self, package_manager: PackageManager, is_online: bool) -> Result<()>;

    /// Generate route types for the new project
    async fn run_typegen(&self, package_manager: PackageManager) -> Result<()>;
}

/// Program and arguments for installing dependencies
pub fn install_command(package_manager: PackageManager, is_online: bool) -> (String, Vec<String>) {
    let mut args = vec!["install".to_string()];
    // Only yarn and pnpm can resolve from their offline cache
    if !is_online && matches!(package_manager, PackageManager::Yarn | PackageManager::Pnpm) {
        args.push("--offline".to_string());
    }
    (package_manager.as_str().to_string(), args)
}

/// Program and arguments for `next typegen`
pub fn typegen_command(package_manager: PackageManager) -> (String, Vec<String>) {
    let (program, prefix): (&str, &[&str]) = match package_manager {
        PackageManager::Npm => ("npx", &[]),
        PackageManager::Pnpm => ("pnpm", &["exec"]),
        PackageManager::Yarn => ("yarn", &[]),
        PackageManager::Bun => ("bunx", &[]),
    };
    let args = prefix
        .iter()
        .chain(["next", "typegen"].iter())
        .map(|arg| arg.to_string())
        .collect();
    (program.to_string(), args)
}

/// Runs the package manager as a child process inside the project root
///
/// Output is inherited so the user sees the package manager's own progress.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    cwd: PathBuf,
}

impl CommandRunner {
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<()> {
        let command = format!("{} {}", program, args.join(" "));
        debug!(command = %command, cwd = %self.cwd.display(), "spawning package manager");
        println!("{} {}", "Running:".dimmed(), command.yellow());

        let status = TokioCommand::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .env("ADBLOCK", "1")
            .env("NODE_ENV", "development")
            .env("DISABLE_OPENCOLLECTIVE", "1")
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| ScaffoldError::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ScaffoldError::CommandFailed {
                command,
                code: status.code(),
            })
        }
    }
}

#[async_trait]
impl PackageManagerRunner for CommandRunner {
    async fn install(&self, package_manager: PackageManager, is_online: bool) -> Result<()> {
        let (program, args) = install_command(package_manager, is_online);
        self.run(&program, &args).await
    }

    async fn run_typegen(&self, package_manager: PackageManager) -> Result<()> {
        let (program, args) = typegen_command(package_manager);
        self.run(&program, &args).await
    }
}
