//! csgtree CLI - compile OpenSCAD sources and inspect their CSG tree
//!
//! Runs OpenSCAD to produce a `.csg` file, rebuilds it as a tree of
//! deduplicated operator and instance variants, and prints a report.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod openscad;
mod report;
mod settings;

use report::{Summary, TreeDump};
use settings::Settings;

#[derive(Parser)]
#[command(name = "csgtree")]
#[command(about = "Deduplicated scene tree of OpenSCAD CSG output", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a .scad file with OpenSCAD and report its CSG tree
    Compile {
        /// OpenSCAD input file
        scad: PathBuf,
        /// Name of the CSG output file inside the working directory
        /// (default: <scad stem>.csg)
        #[arg(long)]
        csg: Option<String>,
        /// Working directory (created if missing)
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// Number of threads to run in parallel (accepted, not used)
        #[arg(long)]
        threads: Option<usize>,
        /// OpenSCAD executable
        #[arg(long)]
        openscad: Option<PathBuf>,
        /// TOML file with default settings
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Report the tree of an existing .csg file
    Parse {
        /// CSG file produced by OpenSCAD
        csg: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print only the indented tree of an existing .csg file
    Tree {
        /// CSG file produced by OpenSCAD
        csg: PathBuf,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Print the parse result as JSON instead of a text report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile {
            scad,
            csg,
            workdir,
            threads,
            openscad,
            config,
            output,
        } => {
            let mut settings = match config {
                Some(path) => Settings::from_file(&path)?,
                None => Settings::default(),
            };
            if let Some(workdir) = workdir {
                settings.workdir = workdir;
            }
            if let Some(threads) = threads {
                settings.threads = threads;
            }
            if openscad.is_some() {
                settings.openscad = openscad;
            }
            settings.validate()?;

            let csg_path = compile(&scad, csg.as_deref(), &settings)?;
            report_file(&csg_path, &output)?;
        }
        Commands::Parse { csg, output } => {
            report_file(&csg, &output)?;
        }
        Commands::Tree { csg } => {
            let parsed = csgtree::parse_file(&csg)?;
            print!("{}", TreeDump(&parsed));
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Compile `scad` into the working directory and return the CSG path.
fn compile(scad: &Path, csg: Option<&str>, settings: &Settings) -> Result<PathBuf> {
    debug!(threads = settings.threads, "parallel compilation is not used");

    let csg_name = match csg {
        Some(name) => PathBuf::from(name),
        None => default_csg_name(scad)?,
    };
    let csg_path = settings.workdir.join(csg_name);

    openscad::prepare_workdir(&settings.workdir)?;
    let exe = openscad::locate(settings.openscad.as_deref())?;
    openscad::compile(&exe, scad, &csg_path)
        .with_context(|| format!("failed to compile {}", scad.display()))?;

    info!(path = %csg_path.display(), "wrote CSG");
    Ok(csg_path)
}

/// `model.scad` -> `model.csg`.
fn default_csg_name(scad: &Path) -> Result<PathBuf> {
    let stem = scad
        .file_stem()
        .ok_or_else(|| anyhow::anyhow!("cannot derive a CSG name from {}", scad.display()))?;
    Ok(Path::new(stem).with_extension("csg"))
}

fn report_file(csg: &Path, output: &OutputArgs) -> Result<()> {
    let parsed = csgtree::parse_file(csg)?;

    if output.json {
        println!("{}", parsed.to_json()?);
    } else {
        print!("{}", Summary(&parsed));
        println!("Tree:");
        print!("{}", TreeDump(&parsed));
    }
    Ok(())
}
