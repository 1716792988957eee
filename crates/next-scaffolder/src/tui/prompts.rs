//! Charm-style CLI prompts using cliclack

use crate::config::{Linter, Overrides, Preferences};
use crate::options::{Bundler, InstallOptions, Mode, PackageManager, TemplateKind};
use crate::runtime::{check, CommandRunner};
use crate::scaffold::Scaffolder;
use crate::templates::TemplateLocator;
use crate::validate;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_PROJECT_NAME: &str = "my-app";

const SETUP_RECOMMENDED: &str = "recommended";
const SETUP_REUSE: &str = "reuse";
const SETUP_CUSTOMIZE: &str = "customize";

/// CLI arguments for the create command
///
/// `None` means "not given on the command line": the value comes from a
/// prompt, saved preferences or the defaults, in that order.
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project directory to create
    pub directory: Option<PathBuf>,
    pub typescript: Option<bool>,
    pub tailwind: Option<bool>,
    pub linter: Option<Linter>,
    pub src_dir: Option<bool>,
    pub import_alias: Option<String>,
    /// API-only project without React
    pub api: bool,
    pub empty: Option<bool>,
    pub bundler: Option<Bundler>,
    pub react_compiler: Option<bool>,
    pub package_manager: Option<PackageManager>,
    pub skip_install: bool,
    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
    /// Forget saved preferences before starting
    pub reset_preferences: bool,
    /// Local directory to use for templates instead of the bundled ones
    pub template_dir: Option<PathBuf>,
}

/// Run the CLI with interactive prompts
pub async fn run(args: CreateArgs, cli_version: &str) -> Result<()> {
    cliclack::intro(format!("better-next-app v{cli_version}"))?;

    let interactive = !args.yes && !check::is_ci();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Step 1: Project directory and name
    let root = select_directory(&args, &cwd, interactive)?;
    let app_name = project_name(&root)?;
    check_directory(&root)?;

    // Step 2: Resolve choices from flags, preferences and prompts
    let prefs = resolve_preferences(&args, interactive).await?;

    // Step 3: Package manager
    let package_manager = args
        .package_manager
        .unwrap_or_else(check::detect_package_manager);
    if !args.skip_install {
        check_package_manager(package_manager)?;
    }
    let is_online = if args.skip_install {
        true
    } else {
        check_online().await
    };

    // Step 4: Create project
    tokio::fs::create_dir_all(&root)
        .await
        .with_context(|| format!("Failed to create {}", root.display()))?;
    validate::ensure_writable(&root).with_context(|| {
        format!(
            "The application path is not writable, please check folder permissions: {}",
            root.display()
        )
    })?;

    let options = install_options(
        &args,
        &prefs,
        app_name.clone(),
        root.clone(),
        package_manager,
        is_online,
    );
    let locator = match &args.template_dir {
        Some(path) => {
            cliclack::log::info(format!("Using local templates from {}", path.display()))?;
            TemplateLocator::new(path)
        }
        None => TemplateLocator::from_env(),
    };

    println!();
    let scaffolder = Scaffolder::new(
        locator,
        Overrides::from_env(),
        CommandRunner::new(&root),
    );
    scaffolder
        .install(&options)
        .await
        .with_context(|| format!("Failed to create {}", app_name))?;

    // Step 5: Show next steps
    cliclack::log::success(format!("Success! Created {} at {}", app_name, root.display()))?;
    print_next_steps(&next_steps(&root, &cwd, package_manager, args.skip_install))?;

    Ok(())
}

/// Absolute project path for a directory argument
fn resolve_root(cwd: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    }
}

fn select_directory(args: &CreateArgs, cwd: &Path, interactive: bool) -> Result<PathBuf> {
    let dir = match &args.directory {
        Some(dir) => dir.clone(),
        None if !interactive => PathBuf::from(DEFAULT_PROJECT_NAME),
        None => {
            let input: String = cliclack::input("What is your project named?")
                .placeholder(DEFAULT_PROJECT_NAME)
                .default_input(DEFAULT_PROJECT_NAME)
                .validate(|input: &String| {
                    let name = Path::new(input.trim())
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let result = validate::validate_npm_name(&name);
                    match result.problems().into_iter().next() {
                        Some(problem) if !result.valid_for_new_packages => {
                            Err(format!("Invalid project name: {problem}"))
                        }
                        _ => Ok(()),
                    }
                })
                .interact()?;
            PathBuf::from(input.trim())
        }
    };

    Ok(resolve_root(cwd, &dir))
}

/// Package name derived from the last path component
fn project_name(root: &Path) -> Result<String> {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Project directory has no name")?;

    let result = validate::validate_npm_name(&name);
    if !result.valid_for_new_packages {
        cliclack::log::error(format!(
            "Could not create a project called \"{}\" because of npm naming restrictions:\n{}",
            name,
            result
                .problems()
                .iter()
                .map(|p| format!("  * {p}"))
                .collect::<Vec<_>>()
                .join("\n")
        ))?;
        anyhow::bail!("Invalid project name: {}", name);
    }

    Ok(name)
}

fn check_directory(root: &Path) -> Result<()> {
    let conflicts = validate::conflicting_files(root)
        .with_context(|| format!("Failed to read {}", root.display()))?;
    if conflicts.is_empty() {
        return Ok(());
    }

    cliclack::log::error(format!(
        "The directory {} contains files that could conflict:\n{}",
        root.display(),
        conflicts
            .iter()
            .map(|c| format!("  {c}"))
            .collect::<Vec<_>>()
            .join("\n")
    ))?;
    anyhow::bail!("Either try using a new directory name, or remove the files listed above.");
}

async fn resolve_preferences(args: &CreateArgs, interactive: bool) -> Result<Preferences> {
    let path = Preferences::default_path();

    if args.reset_preferences {
        if let Some(path) = &path {
            Preferences::clear(path).await?;
            cliclack::log::info("Preferences reset")?;
        }
    }

    let saved = match &path {
        Some(path) => match Preferences::load(path).await {
            Ok(saved) => saved,
            Err(e) => {
                cliclack::log::warning(format!("Ignoring saved preferences: {e}"))?;
                None
            }
        },
        None => None,
    };

    let base = if interactive {
        match select_setup(saved.is_some())? {
            SETUP_REUSE => saved.unwrap_or_default(),
            SETUP_CUSTOMIZE => customize(args, saved.unwrap_or_default())?,
            _ => Preferences::default(),
        }
    } else {
        saved.unwrap_or_default()
    };
    let prefs = apply_flags(base, args);

    if let Some(path) = &path {
        if let Err(e) = prefs.save(path).await {
            cliclack::log::warning(format!("Could not save preferences: {e}"))?;
        }
    }

    Ok(prefs)
}

fn select_setup(has_saved: bool) -> Result<&'static str> {
    let mut select = cliclack::select("Would you like to use the recommended Next.js defaults?")
        .item(SETUP_RECOMMENDED, "Yes, use recommended defaults", "");
    if has_saved {
        select = select.item(SETUP_REUSE, "No, reuse previous settings", "");
    }
    select = select.item(SETUP_CUSTOMIZE, "No, customize settings", "");
    Ok(select.interact()?)
}

/// Ask for every choice not already given as a flag
fn customize(args: &CreateArgs, mut prefs: Preferences) -> Result<Preferences> {
    if args.typescript.is_none() {
        prefs.typescript = cliclack::confirm("Would you like to use TypeScript?")
            .initial_value(prefs.typescript)
            .interact()?;
    }

    if args.linter.is_none() {
        prefs.linter = cliclack::select("Which linter would you like to use?")
            .item(Linter::Eslint, "ESLint", "")
            .item(Linter::Biome, "Biome", "")
            .item(Linter::None, "None", "")
            .initial_value(prefs.linter)
            .interact()?;
    }

    if args.tailwind.is_none() && !args.api {
        prefs.tailwind = cliclack::confirm("Would you like to use Tailwind CSS?")
            .initial_value(prefs.tailwind)
            .interact()?;
    }

    if args.src_dir.is_none() {
        prefs.src_dir = cliclack::confirm("Would you like your code inside a `src/` directory?")
            .initial_value(prefs.src_dir)
            .interact()?;
    }

    if args.react_compiler.is_none() && !args.api {
        prefs.react_compiler = cliclack::confirm("Would you like to use React Compiler?")
            .initial_value(prefs.react_compiler)
            .interact()?;
    }

    if args.bundler.is_none() {
        prefs.bundler = cliclack::select("Which bundler would you like to use?")
            .item(Bundler::Turbopack, "Turbopack", "recommended")
            .item(Bundler::Webpack, "Webpack", "")
            .item(Bundler::Rspack, "Rspack", "")
            .initial_value(prefs.bundler)
            .interact()?;
    }

    if args.import_alias.is_none() {
        prefs.customize_alias = cliclack::confirm(format!(
            "Would you like to customize the import alias ({} by default)?",
            crate::DEFAULT_IMPORT_ALIAS
        ))
        .initial_value(prefs.customize_alias)
        .interact()?;

        if prefs.customize_alias {
            let alias: String = cliclack::input("What import alias would you like configured?")
                .placeholder(crate::DEFAULT_IMPORT_ALIAS)
                .default_input(&prefs.import_alias)
                .validate(|input: &String| validate::validate_import_alias(input.trim()))
                .interact()?;
            prefs.import_alias = alias.trim().to_string();
        } else {
            prefs.import_alias = crate::DEFAULT_IMPORT_ALIAS.to_string();
        }
    }

    Ok(prefs)
}

/// Command-line flags override whatever the preferences say
fn apply_flags(mut prefs: Preferences, args: &CreateArgs) -> Preferences {
    if let Some(typescript) = args.typescript {
        prefs.typescript = typescript;
    }
    if let Some(tailwind) = args.tailwind {
        prefs.tailwind = tailwind;
    }
    if let Some(linter) = args.linter {
        prefs.linter = linter;
    }
    if let Some(src_dir) = args.src_dir {
        prefs.src_dir = src_dir;
    }
    if let Some(alias) = &args.import_alias {
        prefs.customize_alias = alias != crate::DEFAULT_IMPORT_ALIAS;
        prefs.import_alias = alias.clone();
    }
    if let Some(empty) = args.empty {
        prefs.empty_template = empty;
    }
    if let Some(bundler) = args.bundler {
        prefs.bundler = bundler;
    }
    if let Some(react_compiler) = args.react_compiler {
        prefs.react_compiler = react_compiler;
    }
    prefs
}

fn install_options(
    args: &CreateArgs,
    prefs: &Preferences,
    app_name: String,
    root: PathBuf,
    package_manager: PackageManager,
    is_online: bool,
) -> InstallOptions {
    let tailwind = prefs.tailwind && !args.api;
    InstallOptions {
        app_name,
        root,
        package_manager,
        is_online,
        template: TemplateKind::select(args.api, tailwind, prefs.empty_template),
        mode: if prefs.typescript { Mode::Ts } else { Mode::Js },
        tailwind,
        eslint: prefs.linter.eslint(),
        biome: prefs.linter.biome(),
        src_dir: prefs.src_dir,
        skip_install: args.skip_install,
        react_compiler: prefs.react_compiler && !args.api,
        import_alias: prefs.import_alias.clone(),
        bundler: prefs.bundler,
    }
}

fn check_package_manager(package_manager: PackageManager) -> Result<()> {
    let info = check::check_package_manager(package_manager);
    let Some(version) = info.version.filter(|_| info.available) else {
        cliclack::log::error(format!("{} is not installed", info.name))?;
        anyhow::bail!(
            "Install {} or rerun with --skip-install to only write the project files.",
            info.name
        );
    };

    if let Some(warning) = check::check_compatibility(package_manager, &version) {
        cliclack::log::warning(warning)?;
    }
    Ok(())
}

async fn check_online() -> bool {
    let spinner = cliclack::spinner();
    spinner.start("Checking network...");
    let online = check::is_online().await;
    if online {
        spinner.stop("Registry reachable");
    } else {
        spinner.stop("Offline, installing from the local cache");
    }
    online
}

fn next_steps(
    root: &Path,
    cwd: &Path,
    package_manager: PackageManager,
    skip_install: bool,
) -> Vec<String> {
    let mut steps = Vec::new();

    if root != cwd {
        let display = root.strip_prefix(cwd).unwrap_or(root);
        steps.push(format!("cd {}", display.display()));
    }
    if skip_install {
        steps.push(format!("{} install", package_manager.as_str()));
    }
    steps.push(package_manager.run_script("dev"));

    steps
}

fn print_next_steps(steps: &[String]) -> Result<()> {
    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}
