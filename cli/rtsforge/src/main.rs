//! rtsforge CLI — inspect and resolve cross-compilation target descriptors.

mod commands;
mod manifest;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use manifest::{write_template, RegistrySources, RtsforgeManifest};

#[derive(Parser)]
#[command(name = "rtsforge", version, about = "Target descriptor registry for embedded runtimes")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Extra directory of .target.toml descriptors (repeatable)
    #[arg(long = "targets-dir", global = true)]
    targets_dirs: Vec<PathBuf>,
    /// Do not register the built-in catalogue
    #[arg(long, global = true)]
    no_builtins: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered targets
    List,
    /// Show a target descriptor as declared
    Describe {
        /// Target name
        name: String,
        /// Output format (human, toml)
        #[arg(long)]
        format: Option<String>,
    },
    /// Print the flattened build recipe for a target
    Resolve {
        /// Target name (default: [targets] default in rtsforge.toml)
        name: Option<String>,
        /// Output format (human, toml, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Check descriptors for errors and suspicious merges
    Validate {
        /// Single target to check (all if omitted)
        name: Option<String>,
    },
    /// Create a template descriptor in targets/
    Init {
        /// Target name
        name: String,
        /// Parent descriptor to specialize
        #[arg(long)]
        parent: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (manifest, project_dir) = match RtsforgeManifest::find_and_load(&cwd)? {
        Some((manifest, dir)) => (Some(manifest), dir),
        None => (None, cwd),
    };

    let load = || {
        RegistrySources::new(manifest.as_ref(), &project_dir, &cli.targets_dirs, cli.no_builtins)
            .load()
    };

    match cli.command {
        Commands::Init { name, parent } => {
            commands::target::init(&project_dir, &name, parent.as_deref())?;
            if manifest.is_none() {
                write_template(&project_dir, &name)?;
            }
            Ok(())
        }
        Commands::List => commands::target::list(&load()?),
        Commands::Describe { name, format } => {
            commands::target::describe(&load()?, &name, format.as_deref())
        }
        Commands::Resolve { name, format } => {
            let name = name
                .or_else(|| manifest.as_ref().and_then(|m| m.default_target().map(str::to_string)))
                .context("no target given and no [targets] default in rtsforge.toml")?;
            commands::resolve::run(&load()?, &name, format.as_deref())
        }
        Commands::Validate { name } => commands::target::validate(&load()?, name.as_deref()),
    }
}
