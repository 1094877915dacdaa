//! CSV output for the two run artifacts: fact table and quarantine ledger.

use std::path::Path;

use stocklens_engine::{FactRow, QuarantinedRecord};

const FACT_COLUMNS: [&str; 8] = [
    "store_id",
    "product_id",
    "date",
    "quantity",
    "restock_qty",
    "damaged_qty",
    "effective_stock",
    "note",
];

pub fn write_fact_csv(path: &Path, facts: &[FactRow]) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| e.to_string())?;
    writer.write_record(FACT_COLUMNS).map_err(|e| e.to_string())?;

    for fact in facts {
        writer
            .write_record([
                fact.store_id.clone(),
                fact.product_id.clone(),
                fact.date.format("%Y-%m-%d").to_string(),
                fact.quantity.to_string(),
                fact.restock_qty.to_string(),
                fact.damaged_qty.to_string(),
                fact.effective_stock.to_string(),
                fact.note.clone().unwrap_or_default(),
            ])
            .map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())
}

/// Ledger batches can carry different schemas (snapshot vs restock
/// columns), so the header is the column union in first-seen order, with
/// `quarantine_reason` last. Cells absent from a record stay empty.
pub fn write_ledger_csv(path: &Path, ledger: &[QuarantinedRecord]) -> Result<(), String> {
    let mut columns: Vec<String> = Vec::new();
    for entry in ledger {
        for (name, _) in entry.record.fields() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| e.to_string())?;

    let mut header = columns.clone();
    header.push("quarantine_reason".to_string());
    writer.write_record(&header).map_err(|e| e.to_string())?;

    for entry in ledger {
        let mut row: Vec<String> = columns
            .iter()
            .map(|column| entry.record.display(column).unwrap_or_default())
            .collect();
        row.push(entry.quarantine_reason.clone());
        writer.write_record(&row).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())
}
