//! uvmask: Command-line interface for UV island analysis and masking.
//!
//! This tool exposes uv-mask from the command line, suitable for inspecting
//! exported meshes and scripting mask setups.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=uv_mask=info` - Analysis summaries
//! - `RUST_LOG=uv_mask=debug` - Per-pass link counts and cache transitions
//! - `RUST_LOG=uv_mask::timing=debug` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Island table with info logging
//! RUST_LOG=uv_mask=info uvmask islands body.obj --tolerance 0.002
//!
//! # Which island is under a UV point
//! uvmask pick body.obj --u 0.25 --v 0.6
//!
//! # Weight statistics for a mask over islands 0 and 3
//! uvmask mask body.obj --islands 0,3 --feather 0.05 --format json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod load;
mod output;

use commands::{islands, mask, pick};

/// uvmask - A command-line tool for UV island analysis and masking.
///
/// Find UV islands in OBJ meshes, pick islands by UV coordinate, and evaluate
/// island masks into per-vertex weights.
#[derive(Parser)]
#[command(name = "uvmask")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Partitioning options shared by every subcommand.
#[derive(clap::Args, Clone)]
pub struct PartitionArgs {
    /// UV distance within which vertices count as coincident
    #[arg(long, default_value = "0.001")]
    pub tolerance: f64,

    /// Use the legacy any-close-UV connectivity
    #[arg(long)]
    pub legacy: bool,

    /// Stop after this many islands
    #[arg(long, default_value = "10000")]
    pub max_islands: usize,

    /// Use pairwise scans instead of spatial indices
    #[arg(long)]
    pub brute_force: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the UV islands of a mesh
    Islands {
        /// Input OBJ file
        input: PathBuf,

        #[command(flatten)]
        partition: PartitionArgs,

        /// Merge islands whose UVs come within this distance
        #[arg(long)]
        consolidate: Option<f64>,

        /// Analyze each OBJ object separately
        #[arg(long)]
        by_object: bool,
    },

    /// Report the island under a UV coordinate
    Pick {
        /// Input OBJ file
        input: PathBuf,

        /// U coordinate
        #[arg(long, allow_negative_numbers = true)]
        u: f64,

        /// V coordinate
        #[arg(long, allow_negative_numbers = true)]
        v: f64,

        #[command(flatten)]
        partition: PartitionArgs,
    },

    /// Evaluate a mask and report per-vertex weight statistics
    Mask {
        /// Input OBJ file
        input: PathBuf,

        /// Island ids to target (comma separated)
        #[arg(long, value_delimiter = ',')]
        islands: Vec<u32>,

        /// Vertex indices to target as a separate vertex-group mask
        #[arg(long, value_delimiter = ',')]
        vertices: Vec<u32>,

        /// Mask strength (0-1)
        #[arg(long, default_value = "1.0")]
        strength: f64,

        /// Invert the masks
        #[arg(long)]
        invert: bool,

        /// Feather radius in UV units (0-0.5)
        #[arg(long, default_value = "0.0")]
        feather: f64,

        /// Distance used for feathering
        #[arg(long, default_value = "uv")]
        metric: MetricArg,

        /// How the island and vertex masks are combined
        #[arg(long, default_value = "union")]
        mode: ModeArg,

        /// Print every vertex weight
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        partition: PartitionArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MetricArg {
    /// UV distance to the nearest targeted vertex
    Uv,
    /// Vertex index distance (legacy)
    Index,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Per-vertex maximum
    Union,
    /// Per-vertex minimum
    Intersection,
    /// First mask minus the second, floored at zero
    Difference,
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "uv_mask=info",
            2 => "uv_mask=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    // Nicer panic reports in development builds
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Islands {
            input,
            partition,
            consolidate,
            by_object,
        } => islands::run(input, partition, *consolidate, *by_object, &cli),
        Commands::Pick {
            input,
            u,
            v,
            partition,
        } => pick::run(input, *u, *v, partition, &cli),
        Commands::Mask {
            input,
            islands,
            vertices,
            strength,
            invert,
            feather,
            metric,
            mode,
            all,
            partition,
        } => mask::run(
            input,
            &mask::MaskArgs {
                islands: islands.clone(),
                vertices: vertices.clone(),
                strength: *strength,
                invert: *invert,
                feather: *feather,
                metric: *metric,
                mode: *mode,
                all: *all,
            },
            partition,
            &cli,
        ),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(mask_err) = e.downcast_ref::<uv_mask::MaskError>() {
                eprintln!("{}: {}", "Error".red().bold(), mask_err);
                eprintln!("  {}: {}", "Code".cyan(), mask_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    mask_err.recovery_suggestion()
                );
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
