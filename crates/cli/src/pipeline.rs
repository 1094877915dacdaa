//! `stocklens run` / `stocklens validate` — config-driven pipeline runs.

use std::path::{Path, PathBuf};

use stocklens_engine::engine::{DATASET_DAMAGE, DATASET_RESTOCK, DATASET_SNAPSHOT};
use stocklens_engine::ingest::{parse_batch, parse_catalog};
use stocklens_engine::{PipelineConfig, PipelineInput, RecordBatch};

use crate::exit_codes::EXIT_QUARANTINE;
use crate::export;
use crate::CliError;

/// Name of the master catalog file inside the data directory.
const PRODUCTS_FILE: &str = "products.csv";

/// Read an input file whose absence is a distinct, fatal condition.
fn read_input_file(path: &Path) -> Result<String, CliError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::input(format!("file not found: {}", path.display())))
        }
        Err(e) => Err(CliError::input(format!("cannot read {}: {e}", path.display()))),
    }
}

/// File names under `data_dir` matching the dataset's glob, sorted for
/// deterministic ingestion order.
fn matching_files(data_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, CliError> {
    let glob = glob::Pattern::new(pattern)
        .map_err(|e| CliError::config(format!("bad file_pattern \"{pattern}\": {e}")))?;

    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        CliError::input(format!("cannot read data dir {}: {e}", data_dir.display()))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CliError::input(e.to_string()))?;
        let name = entry.file_name();
        if glob.matches(&name.to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Ingest every file of one dataset stream.
fn load_stream(
    dataset: &str,
    config: &PipelineConfig,
    data_dir: &Path,
) -> Result<Vec<RecordBatch>, CliError> {
    let pattern = config
        .datasets
        .get(dataset)
        .map(|rules| rules.file_pattern.clone())
        .unwrap_or_else(|| format!("{dataset}*.csv"));

    let mut batches = Vec::new();
    for path in matching_files(data_dir, &pattern)? {
        eprintln!("  ingesting {}", path.display());
        let text = read_input_file(&path)?;
        let batch =
            parse_batch(dataset, &text).map_err(|e| CliError::runtime(e.to_string()))?;
        batches.push(batch);
    }
    Ok(batches)
}

pub fn cmd_run(
    config_path: PathBuf,
    data_dir: PathBuf,
    out_dir: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    strict: bool,
) -> Result<(), CliError> {
    let config_str = read_input_file(&config_path)?;
    let config = PipelineConfig::from_toml(&config_str)
        .map_err(|e| CliError::config(e.to_string()))?;

    let catalog_text = read_input_file(&data_dir.join(PRODUCTS_FILE)).map_err(|e| {
        e.with_hint("run `stocklens gen` to create a sample dataset")
    })?;
    let catalog =
        parse_catalog(&catalog_text).map_err(|e| CliError::runtime(e.to_string()))?;

    let input = PipelineInput {
        snapshots: load_stream(DATASET_SNAPSHOT, &config, &data_dir)?,
        restocks: load_stream(DATASET_RESTOCK, &config, &data_dir)?,
        damages: load_stream(DATASET_DAMAGE, &config, &data_dir)?,
        catalog,
    };

    let result = stocklens_engine::run(&config, input)
        .map_err(|e| CliError::runtime(e.to_string()))?;

    std::fs::create_dir_all(&out_dir).map_err(|e| {
        CliError::runtime(format!("cannot create {}: {e}", out_dir.display()))
    })?;

    let fact_path = out_dir.join("inventory_fact.csv");
    export::write_fact_csv(&fact_path, &result.facts)
        .map_err(|e| CliError::runtime(e.to_string()))?;
    eprintln!("wrote {}", fact_path.display());

    let ledger_path = out_dir.join("quarantine_records.csv");
    export::write_ledger_csv(&ledger_path, &result.ledger)
        .map_err(|e| CliError::runtime(e.to_string()))?;
    eprintln!("wrote {}", ledger_path.display());

    if json_output || output_file.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str).map_err(|e| {
                CliError::runtime(format!("cannot write {}: {e}", path.display()))
            })?;
            eprintln!("wrote {}", path.display());
        }
        if json_output {
            println!("{json_str}");
        }
    }

    // Human summary to stderr
    let s = &result.summary;
    for (dataset, counts) in &s.datasets {
        eprintln!(
            "{dataset}: {} records — {} valid, {} quarantined, {} recovered",
            counts.total, counts.valid, counts.quarantined, counts.recovered,
        );
    }
    eprintln!(
        "fact table: {} rows; quarantine ledger: {} rows ({} pending review)",
        s.fact_rows,
        result.ledger.len(),
        s.residual_quarantine(),
    );

    if strict && s.residual_quarantine() > 0 {
        return Err(CliError {
            code: EXIT_QUARANTINE,
            message: format!(
                "{} quarantined record(s) pending review",
                s.residual_quarantine()
            ),
            hint: None,
        });
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = read_input_file(&config_path)?;
    match PipelineConfig::from_toml(&config_str) {
        Ok(config) => {
            let checks: usize = config
                .datasets
                .values()
                .flat_map(|d| &d.required_columns)
                .map(|c| c.checks.len())
                .sum();
            eprintln!(
                "valid: '{}' with {} dataset(s), {} check(s)",
                config.name,
                config.datasets.len(),
                checks,
            );
            Ok(())
        }
        Err(e) => Err(CliError::config(e.to_string())),
    }
}
