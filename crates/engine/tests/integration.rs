use std::path::PathBuf;

use stocklens_engine::config::PipelineConfig;
use stocklens_engine::engine::{
    run, PipelineInput, DATASET_DAMAGE, DATASET_RESTOCK, DATASET_SNAPSHOT,
};
use stocklens_engine::ingest::{parse_batch, parse_catalog};
use stocklens_engine::model::PipelineResult;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_and_run() -> PipelineResult {
    let config = PipelineConfig::from_toml(&read_fixture("rules.toml")).unwrap();
    let input = PipelineInput {
        snapshots: vec![
            parse_batch(DATASET_SNAPSHOT, &read_fixture("inventory_snapshot_1.csv")).unwrap(),
        ],
        restocks: vec![
            parse_batch(DATASET_RESTOCK, &read_fixture("restock_events_1.csv")).unwrap(),
        ],
        damages: vec![parse_batch(DATASET_DAMAGE, &read_fixture("damaged_log_1.csv")).unwrap()],
        catalog: parse_catalog(&read_fixture("products.csv")).unwrap(),
    };
    run(&config, input).unwrap()
}

#[test]
fn partition_complete_across_all_streams() {
    let result = load_and_run();
    let s = &result.summary;
    assert_eq!(s.total_records, 10 + 5 + 2);
    assert_eq!(s.total_valid + s.total_quarantined, s.total_records);
    assert_eq!(s.total_quarantined, result.ledger.len());
}

#[test]
fn quarantine_reasons_survive_to_ledger() {
    let result = load_and_run();
    let reasons: Vec<&str> = result
        .ledger
        .iter()
        .map(|q| q.quarantine_reason.as_str())
        .collect();

    assert_eq!(reasons.iter().filter(|r| **r == "quantity < 0").count(), 1);
    assert_eq!(reasons.iter().filter(|r| **r == "quantity > 1000").count(), 1);
    // Recoverable typo and the hopeless identifier both land here.
    assert_eq!(
        reasons.iter().filter(|r| **r == "Unknown Product ID").count(),
        2
    );
    // Both halves of the duplicate pair.
    assert_eq!(reasons.iter().filter(|r| **r == "Duplicate Entry").count(), 2);
    assert_eq!(reasons.iter().filter(|r| **r == "restock_qty < 0").count(), 1);
    assert_eq!(result.ledger.len(), 7);
}

#[test]
fn recovery_double_accounting() {
    let result = load_and_run();

    // Recovered fact row with the corrected identifier and audit note.
    let fixed = result
        .facts
        .iter()
        .find(|f| f.store_id == "S000" && f.product_id == "P0005")
        .expect("recovered row should reach the fact table");
    assert_eq!(fixed.quantity, 50);
    assert_eq!(
        fixed.note.as_deref(),
        Some("Fixed (Fuzzy Match: P0O05 -> P0005, Score: 90)")
    );

    // The original corrupted row is still in the ledger.
    assert!(result.ledger.iter().any(|q| {
        q.record.display("product_id").as_deref() == Some("P0O05")
            && q.quarantine_reason == "Unknown Product ID"
    }));

    // The hopeless identifier was not recovered.
    assert_eq!(result.summary.total_recovered, 1);
    assert!(!result.facts.iter().any(|f| f.product_id == "QX999"));
}

#[test]
fn fact_table_values() {
    let result = load_and_run();
    assert_eq!(result.facts.len(), 4);

    let fact = |store: &str, product: &str| {
        result
            .facts
            .iter()
            .find(|f| f.store_id == store && f.product_id == product)
            .unwrap_or_else(|| panic!("missing fact for ({store}, {product})"))
    };

    // Latest snapshot (2024-01-02, qty 180) + restocks 300 - damage 40.
    let f = fact("S000", "P0001");
    assert_eq!(f.quantity, 180);
    assert_eq!(f.restock_qty, 300);
    assert_eq!(f.damaged_qty, 40);
    assert_eq!(f.effective_stock, 440);

    // No restock/damage activity fills zero.
    let f = fact("S000", "P0002");
    assert_eq!((f.restock_qty, f.damaged_qty), (0, 0));
    assert_eq!(f.effective_stock, 90);

    // 40 + 60 - 55.
    assert_eq!(fact("S001", "P0005").effective_stock, 45);

    // Restock-only key (S002, P0007) produces no fact row.
    assert!(!result.facts.iter().any(|f| f.store_id == "S002"));
}

#[test]
fn facts_ordered_by_key() {
    let result = load_and_run();
    let keys: Vec<(String, String)> = result
        .facts
        .iter()
        .map(|f| (f.store_id.clone(), f.product_id.clone()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn result_serializes_to_json() {
    let result = load_and_run();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["meta"]["config_name"], "Retail Inventory QC");
    assert_eq!(json["summary"]["fact_rows"], 4);
    assert_eq!(json["summary"]["datasets"]["inventory_snapshot"]["total"], 10);

    // Ledger rows serialize as field maps with the reason alongside.
    let first = &json["ledger"][0];
    assert!(first["quarantine_reason"].is_string());
    assert!(first["record"].is_object());
}

#[test]
fn rerun_is_deterministic() {
    let a = load_and_run();
    let b = load_and_run();
    assert_eq!(a.facts, b.facts);
    assert_eq!(a.summary.total_quarantined, b.summary.total_quarantined);
    let reasons =
        |r: &PipelineResult| -> Vec<String> {
            r.ledger.iter().map(|q| q.quarantine_reason.clone()).collect()
        };
    assert_eq!(reasons(&a), reasons(&b));
}
