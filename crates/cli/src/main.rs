// StockLens CLI - batch data-quality pipeline for retail inventory extracts

mod datagen;
mod exit_codes;
mod export;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_CONFIG_INVALID, EXIT_INPUT_MISSING, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "stocklens")]
#[command(about = "Validate, reconcile, and aggregate retail inventory extracts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline from a TOML rules config
    #[command(after_help = "\
Examples:
  stocklens run rules.toml
  stocklens run rules.toml --data-dir data/raw --out-dir data/processed
  stocklens run rules.toml --json
  stocklens run rules.toml --output result.json --strict")]
    Run {
        /// Path to the rules .toml config file
        config: PathBuf,

        /// Directory holding the raw CSV extracts and products.csv
        #[arg(long, default_value = "data/raw")]
        data_dir: PathBuf,

        /// Directory the fact table and quarantine ledger are written to
        #[arg(long, default_value = "data/processed")]
        out_dir: PathBuf,

        /// Output run summary JSON to stdout instead of human summary only
        #[arg(long)]
        json: bool,

        /// Write run summary JSON to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit nonzero when unrecovered quarantined records remain
        #[arg(long)]
        strict: bool,
    },

    /// Validate a rules config without running
    #[command(after_help = "\
Examples:
  stocklens validate rules.toml")]
    Validate {
        /// Path to the rules .toml config file
        config: PathBuf,
    },

    /// Generate a synthetic raw dataset with seeded defects
    #[command(after_help = "\
Examples:
  stocklens gen
  stocklens gen --out-dir data/raw --seed 7 --snapshots 500")]
    Gen {
        /// Directory the generated CSV files are written to
        #[arg(long, default_value = "data/raw")]
        out_dir: PathBuf,

        /// RNG seed; identical seeds reproduce identical files
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of catalog products
        #[arg(long, default_value_t = 50)]
        products: usize,

        /// Number of stores
        #[arg(long, default_value_t = 5)]
        stores: usize,

        /// Number of clean snapshot rows (defect rows are added on top)
        #[arg(long, default_value_t = 200)]
        snapshots: usize,

        /// Number of restock rows
        #[arg(long, default_value_t = 50)]
        restocks: usize,

        /// Number of damage rows
        #[arg(long, default_value_t = 30)]
        damages: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: stocklens <command> [options]");
            eprintln!("       stocklens --help for more information");
            Ok(())
        }
        Some(Commands::Run {
            config,
            data_dir,
            out_dir,
            json,
            output,
            strict,
        }) => pipeline::cmd_run(config, data_dir, out_dir, json, output, strict),
        Some(Commands::Validate { config }) => pipeline::cmd_validate(config),
        Some(Commands::Gen {
            out_dir,
            seed,
            products,
            stores,
            snapshots,
            restocks,
            damages,
        }) => datagen::cmd_gen(datagen::GenOptions {
            out_dir,
            seed,
            products,
            stores,
            snapshots,
            restocks,
            damages,
        }),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG_INVALID, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT_MISSING, message: msg.into(), hint: None }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
