//! simdist command-line interface.
//!
//! Inspects capability dispatch on the running machine and evaluates
//! individual kernels on small inline inputs.

#![warn(clippy::all)]

mod commands;
mod output;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simdist", version, about = "Inspect and run simdist similarity kernels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Suppress normal output.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detected CPU tiers and the kernel selected for every operation.
    Info,

    /// Evaluate one operation on inline vectors.
    ///
    /// Dense inputs are comma-separated floats, binary inputs are
    /// comma-separated u64 words (decimal, 0x or 0b), and sparse inputs are
    /// comma-separated `index:value` pairs.
    Eval {
        /// Operation name, e.g. `f32_dot` or `binary-hamming`.
        operation: String,

        /// First operand.
        #[arg(long, allow_hyphen_values = true, required_unless_present = "input")]
        a: Option<String>,

        /// Second operand, for pairwise operations.
        #[arg(long, allow_hyphen_values = true)]
        b: Option<String>,

        /// Read `{"a": ..., "b": ...}` from a JSON file instead.
        #[arg(long, conflicts_with_all = ["a", "b"])]
        input: Option<PathBuf>,
    },

    /// Time the dense f32 kernels on every detected tier.
    Bench {
        /// Vector length.
        #[arg(long, default_value_t = 768)]
        dims: usize,

        /// Calls per kernel.
        #[arg(long, default_value_t = 100_000)]
        iters: u32,
    },
}

/// Output format for command results.
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info => commands::info::run(cli.format, cli.quiet),
        Commands::Eval {
            operation,
            a,
            b,
            input,
        } => {
            let args = match input {
                Some(path) => commands::eval::EvalArgs::from_file(&operation, &path)?,
                None => commands::eval::EvalArgs {
                    operation,
                    a: a.unwrap_or_default(),
                    b,
                },
            };
            commands::eval::run(&args, cli.format, cli.quiet)
        }
        Commands::Bench { dims, iters } => commands::bench::run(dims, iters, cli.format, cli.quiet),
    }
}
