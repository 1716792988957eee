//! Project materialization: the ordered pipeline from template to installed project

use crate::config::Overrides;
use crate::error::{Result, ScaffoldError};
use crate::options::InstallOptions;
use crate::runtime::PackageManagerRunner;
use crate::templates::{
    copy_template, manifest::write_package_manager_files, move_into_src, patcher,
    rewrite_import_aliases, CopyRules, PackageManifest, TemplateLocator,
};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Destination paths of copied template files
    pub copied_files: Vec<PathBuf>,
    /// Files whose import aliases changed
    pub rewritten_files: usize,
    /// Folders moved under `src/`
    pub moved_dirs: Vec<&'static str>,
    pub manifest: PackageManifest,
    /// `pnpm-workspace.yaml`, when pnpm was chosen
    pub workspace_file: Option<PathBuf>,
}

/// Turns [`InstallOptions`] into a project on disk
///
/// Steps run in a fixed order and stop at the first failure. Nothing is
/// rolled back, so a failed run can leave a partially written directory.
pub struct Scaffolder<R> {
    locator: TemplateLocator,
    overrides: Overrides,
    runner: R,
}

impl<R: PackageManagerRunner> Scaffolder<R> {
    pub fn new(locator: TemplateLocator, overrides: Overrides, runner: R) -> Self {
        Self {
            locator,
            overrides,
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn install(&self, options: &InstallOptions) -> Result<InstallReport> {
        let root = &options.root;
        println!("{}", format!("Using {}.", options.package_manager).bold());
        println!(
            "\nInitializing project with template: {}\n",
            options.template.as_str().cyan()
        );

        let template_dir = self.locator.template_dir(options.template, options.mode);
        let rules = CopyRules::for_options(options);
        let copied_files = copy_template(&template_dir, root, &rules).await?;
        info!(
            template = %options.template,
            mode = %options.mode,
            files = copied_files.len(),
            "copied template"
        );

        patcher::patch_next_config(root, options.mode, options.bundler, options.react_compiler)
            .await?;
        patcher::patch_path_alias(root, options.mode, options.src_dir, &options.import_alias)
            .await?;

        let rewritten_files = if options.uses_default_alias() {
            0
        } else {
            rewrite_import_aliases(root, &options.import_alias).await?
        };

        let moved_dirs = if options.src_dir {
            move_into_src(root, options.template, options.mode).await?
        } else {
            Vec::new()
        };

        let manifest = PackageManifest::build(options, &self.overrides);
        manifest.write(root).await?;
        let workspace_file = write_package_manager_files(root, options.package_manager).await?;

        let report = InstallReport {
            copied_files,
            rewritten_files,
            moved_dirs,
            manifest,
            workspace_file,
        };

        if options.skip_install {
            debug!("skipping dependency install");
            return Ok(report);
        }

        print_dependencies("dependencies", &report.manifest.dependencies);
        print_dependencies("devDependencies", &report.manifest.dev_dependencies);
        println!();

        self.runner
            .install(options.package_manager, options.is_online)
            .await?;

        if let Err(e) = self.runner.run_typegen(options.package_manager).await {
            warn!(error = %e, "route type generation failed");
            eprintln!("{}", typegen_failure_message(&e).red());
        }

        Ok(report)
    }
}

fn typegen_failure_message(error: &ScaffoldError) -> String {
    format!("Error running typegen: {error}")
}

fn print_dependencies(label: &str, deps: &BTreeMap<String, String>) {
    if deps.is_empty() {
        return;
    }
    println!("\nInstalling {}:", label);
    for name in deps.keys() {
        println!("- {}", name.cyan());
    }
}
