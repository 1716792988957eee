//! better-next-app - scaffold Next.js projects

mod logging;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use next_scaffolder::config::Linter;
use next_scaffolder::tui::CreateArgs;
use next_scaffolder::{Bundler, PackageManager, CLI_VERSION};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "better-next-app")]
#[command(about = "CLI for scaffolding Next.js projects")]
#[command(version)]
#[command(group(ArgGroup::new("language").args(["ts", "js"])))]
#[command(group(ArgGroup::new("lint").args(["eslint", "biome", "no_linter"])))]
#[command(group(ArgGroup::new("variant").args(["api", "empty"])))]
#[command(group(ArgGroup::new("build").args(["webpack", "rspack"])))]
#[command(group(ArgGroup::new("manager").args(["use_npm", "use_pnpm", "use_yarn", "use_bun"])))]
pub struct Args {
    /// Project directory to create
    pub directory: Option<PathBuf>,

    /// Initialize as a TypeScript project
    #[arg(long)]
    pub ts: bool,

    /// Initialize as a JavaScript project
    #[arg(long)]
    pub js: bool,

    /// Initialize with Tailwind CSS config
    #[arg(long, conflicts_with = "no_tailwind")]
    pub tailwind: bool,

    /// Initialize without Tailwind CSS
    #[arg(long)]
    pub no_tailwind: bool,

    /// Initialize with ESLint config
    #[arg(long)]
    pub eslint: bool,

    /// Initialize with Biome config
    #[arg(long)]
    pub biome: bool,

    /// Skip linter configuration
    #[arg(long)]
    pub no_linter: bool,

    /// Initialize inside a `src/` directory
    #[arg(long)]
    pub src_dir: bool,

    /// Import alias to use, ending in `/*`
    #[arg(long, value_parser = parse_import_alias)]
    pub import_alias: Option<String>,

    /// Initialize an API-only project without React
    #[arg(long)]
    pub api: bool,

    /// Initialize an empty project
    #[arg(long)]
    pub empty: bool,

    /// Use Webpack instead of Turbopack
    #[arg(long)]
    pub webpack: bool,

    /// Use Rspack instead of Turbopack
    #[arg(long)]
    pub rspack: bool,

    /// Enable the React Compiler
    #[arg(long)]
    pub react_compiler: bool,

    /// Bootstrap the application using npm
    #[arg(long)]
    pub use_npm: bool,

    /// Bootstrap the application using pnpm
    #[arg(long)]
    pub use_pnpm: bool,

    /// Bootstrap the application using Yarn
    #[arg(long)]
    pub use_yarn: bool,

    /// Bootstrap the application using Bun
    #[arg(long)]
    pub use_bun: bool,

    /// Write the project files without installing dependencies
    #[arg(long)]
    pub skip_install: bool,

    /// Use saved preferences or defaults for unanswered prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Forget preferences saved by previous runs
    #[arg(long)]
    pub reset_preferences: bool,

    /// Local directory to use for templates instead of the bundled ones (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

fn parse_import_alias(value: &str) -> Result<String, String> {
    next_scaffolder::validate::validate_import_alias(value)?;
    Ok(value.to_string())
}

/// `Some(true)` for `--flag`, `Some(false)` for `--no-flag`, otherwise unset
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl From<Args> for CreateArgs {
    fn from(args: Args) -> Self {
        let linter = if args.eslint {
            Some(Linter::Eslint)
        } else if args.biome {
            Some(Linter::Biome)
        } else if args.no_linter {
            Some(Linter::None)
        } else {
            None
        };

        let bundler = if args.webpack {
            Some(Bundler::Webpack)
        } else if args.rspack {
            Some(Bundler::Rspack)
        } else {
            None
        };

        let package_manager = [
            (args.use_npm, PackageManager::Npm),
            (args.use_pnpm, PackageManager::Pnpm),
            (args.use_yarn, PackageManager::Yarn),
            (args.use_bun, PackageManager::Bun),
        ]
        .into_iter()
        .find_map(|(set, pm)| set.then_some(pm));

        CreateArgs {
            directory: args.directory,
            typescript: toggle(args.ts, args.js),
            tailwind: toggle(args.tailwind, args.no_tailwind),
            linter,
            src_dir: args.src_dir.then_some(true),
            import_alias: args.import_alias,
            api: args.api,
            empty: args.empty.then_some(true),
            bundler,
            react_compiler: args.react_compiler.then_some(true),
            package_manager,
            skip_install: args.skip_install,
            yes: args.yes,
            reset_preferences: args.reset_preferences,
            template_dir: args.template_dir,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    logging::init_logging(args.verbose, args.quiet)?;
    tracing::debug!(?args, "parsed arguments");

    let result = next_scaffolder::run(args.into(), CLI_VERSION).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
