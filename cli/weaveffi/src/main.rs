//! WeaveFFI CLI: scaffold projects, validate interface definitions, and
//! generate bindings.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use manifest::{WeaveManifest, DEFAULT_INPUT, DEFAULT_OUT_DIR};

#[derive(Parser)]
#[command(name = "weaveffi", version, about = "Generate C ABI bindings from an interface definition")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new WeaveFFI project
    New {
        /// Project name
        name: String,
    },
    /// Generate bindings for one or more targets
    Generate {
        /// IDL file (.toml, .json, .yaml); default from weaveffi.toml or api.toml
        #[arg(long, short)]
        input: Option<PathBuf>,
        /// Output directory (default from weaveffi.toml or generated/)
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Target to generate (c, swift, node, android, wasm); repeatable
        #[arg(long = "target", short)]
        targets: Vec<String>,
    },
    /// Parse and validate an IDL file
    Validate {
        /// IDL file (default from weaveffi.toml or api.toml)
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Check toolchain and project status
    Doctor,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,weaveffi=info,weaveffi_core=info,weaveffi_gen=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::New { name } => commands::new::run(&name),

        Commands::Generate {
            input,
            out,
            targets,
        } => {
            let project = Project::resolve(&cwd)?;
            let input = project.input(input);
            let out = project.out_dir(out);
            let targets = project.targets(targets);
            commands::generate::run(&input, &out, &targets).map(|_| ())
        }

        Commands::Validate { input } => {
            let project = Project::resolve(&cwd)?;
            commands::validate::run(&project.input(input)).map(|_| ())
        }

        Commands::Doctor => commands::doctor::run(&cwd),
    }
}

/// Command-line flags layered over `weaveffi.toml`, if one is found.
///
/// Flag paths are relative to the working directory; manifest paths are
/// relative to the manifest's directory.
struct Project {
    manifest: Option<WeaveManifest>,
    root: PathBuf,
}

impl Project {
    fn resolve(cwd: &Path) -> anyhow::Result<Self> {
        Ok(match WeaveManifest::find_and_load(cwd)? {
            Some((manifest, root)) => Self {
                manifest: Some(manifest),
                root,
            },
            None => Self {
                manifest: None,
                root: cwd.to_path_buf(),
            },
        })
    }

    fn input(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| {
            let configured = self.manifest.as_ref().and_then(|m| m.input());
            self.root.join(configured.unwrap_or(DEFAULT_INPUT))
        })
    }

    fn out_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| {
            let configured = self.manifest.as_ref().and_then(|m| m.out_dir());
            self.root.join(configured.unwrap_or(DEFAULT_OUT_DIR))
        })
    }

    fn targets(&self, flags: Vec<String>) -> Vec<String> {
        if !flags.is_empty() {
            return flags;
        }
        self.manifest
            .as_ref()
            .map(|m| m.targets().to_vec())
            .unwrap_or_default()
    }
}
