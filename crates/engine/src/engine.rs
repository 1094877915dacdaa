use crate::aggregate::aggregate;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::model::{
    DatasetCounts, MasterCatalog, PipelineResult, QuarantinedRecord, Record, RecordBatch,
    RunMeta, RunSummary,
};
use crate::reconcile::Reconciler;
use crate::validate::validate;

pub const DATASET_SNAPSHOT: &str = "inventory_snapshot";
pub const DATASET_RESTOCK: &str = "restock_events";
pub const DATASET_DAMAGE: &str = "damaged_log";

/// Pre-loaded batches for one run, grouped by stream. Each stream may span
/// several files' worth of batches.
pub struct PipelineInput {
    pub snapshots: Vec<RecordBatch>,
    pub restocks: Vec<RecordBatch>,
    pub damages: Vec<RecordBatch>,
    pub catalog: MasterCatalog,
}

struct DatasetOutcome {
    valid: Vec<Record>,
    counts: DatasetCounts,
}

/// Validate one stream's batches, recover what fuzzy matching can, and
/// merge recovered records into the valid set. Original quarantine entries
/// go to the ledger untouched — a recovered record therefore appears both
/// in the valid set (corrected) and in the ledger (original).
fn process_stream(
    dataset: &str,
    batches: Vec<RecordBatch>,
    config: &PipelineConfig,
    catalog: &MasterCatalog,
    reconciler: &Reconciler,
    ledger: &mut Vec<QuarantinedRecord>,
) -> DatasetOutcome {
    let rules = config.datasets.get(dataset);
    let mut valid = Vec::new();
    let mut counts = DatasetCounts::default();

    for batch in batches {
        counts.total += batch.len();
        let partition = validate(batch, rules, catalog);
        let recovered = reconciler.reconcile(&partition.quarantine);

        counts.valid += partition.valid.len();
        counts.quarantined += partition.quarantine.len();
        counts.recovered += recovered.len();

        valid.extend(partition.valid);
        valid.extend(recovered.into_iter().map(|r| r.record));
        ledger.extend(partition.quarantine);
    }

    DatasetOutcome { valid, counts }
}

/// Run the whole pipeline over pre-loaded input: validate every stream,
/// reconcile quarantines, aggregate the surviving records into the fact
/// table. Pure — no filesystem access.
pub fn run(config: &PipelineConfig, input: PipelineInput) -> Result<PipelineResult, PipelineError> {
    let reconciler = Reconciler::new(&input.catalog);
    let mut ledger = Vec::new();
    let mut summary = RunSummary::default();

    let mut record_stream = |dataset: &str, outcome: &DatasetOutcome| {
        summary.total_records += outcome.counts.total;
        summary.total_valid += outcome.counts.valid;
        summary.total_quarantined += outcome.counts.quarantined;
        summary.total_recovered += outcome.counts.recovered;
        summary.datasets.insert(dataset.to_string(), outcome.counts);
    };

    let snapshots = process_stream(
        DATASET_SNAPSHOT,
        input.snapshots,
        config,
        &input.catalog,
        &reconciler,
        &mut ledger,
    );
    record_stream(DATASET_SNAPSHOT, &snapshots);

    let restocks = process_stream(
        DATASET_RESTOCK,
        input.restocks,
        config,
        &input.catalog,
        &reconciler,
        &mut ledger,
    );
    record_stream(DATASET_RESTOCK, &restocks);

    let damages = process_stream(
        DATASET_DAMAGE,
        input.damages,
        config,
        &input.catalog,
        &reconciler,
        &mut ledger,
    );
    record_stream(DATASET_DAMAGE, &damages);

    let facts = aggregate(&snapshots.valid, &restocks.valid, &damages.valid)?;
    summary.fact_rows = facts.len();

    Ok(PipelineResult {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        facts,
        ledger,
    })
}
