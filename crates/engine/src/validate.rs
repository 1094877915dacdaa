//! Record validation and partitioning.
//!
//! Check order is fixed: declared column checks first (in declaration
//! order), then the foreign-key check, then the duplicate check. The
//! quarantine flag is a monotonic OR across all checks; the displayed
//! reason follows a declared attribution policy:
//!
//! - range checks overwrite the reason unconditionally, so the last
//!   matching range check wins the displayed reason;
//! - the foreign-key and duplicate checks set the reason only when no
//!   earlier check flagged the record.
//!
//! Reason strings are best-effort diagnostics, not a complete list of
//! every rule a record violated.

use std::collections::HashMap;

use crate::config::DatasetRules;
use crate::model::{MasterCatalog, Partition, QuarantinedRecord, RecordBatch};

/// Reason assigned to records whose identifier is absent from the master
/// catalog. The Reconciler selects on this exact string.
pub const UNKNOWN_PRODUCT_ID: &str = "Unknown Product ID";

/// Reason assigned to records sharing a (store, product, date) key.
pub const DUPLICATE_ENTRY: &str = "Duplicate Entry";

/// Partition a batch into valid/quarantine. With no rules for the dataset,
/// no checks run and every record passes through unchanged.
pub fn validate(
    batch: RecordBatch,
    rules: Option<&DatasetRules>,
    catalog: &MasterCatalog,
) -> Partition {
    let Some(rules) = rules else {
        return Partition {
            valid: batch.records,
            quarantine: Vec::new(),
        };
    };

    let mut flagged = vec![false; batch.len()];
    let mut reasons: Vec<Option<String>> = vec![None; batch.len()];

    // Declared column checks, in declaration order. Columns absent from the
    // batch schema are skipped silently.
    for rule in &rules.required_columns {
        if !batch.has_column(&rule.name) {
            continue;
        }
        for check in &rule.checks {
            for (i, record) in batch.records.iter().enumerate() {
                let Some(value) = record.int(&rule.name) else {
                    continue;
                };
                if check.flags(value) {
                    reasons[i] = Some(check.reason(&rule.name));
                    flagged[i] = true;
                }
            }
        }
    }

    // Foreign-key check against the master catalog.
    if batch.has_column("product_id") {
        for (i, record) in batch.records.iter().enumerate() {
            let id = record.display("product_id").unwrap_or_default();
            if !catalog.contains(&id) {
                if !flagged[i] {
                    reasons[i] = Some(UNKNOWN_PRODUCT_ID.to_string());
                }
                flagged[i] = true;
            }
        }
    }

    // Duplicate check over (store_id, product_id, date-like column). Every
    // record sharing a key is flagged, including the first occurrence.
    if batch.has_column("store_id") && batch.has_column("product_id") {
        let date_column = ["date", "event_date"]
            .into_iter()
            .find(|c| batch.has_column(c));
        if let Some(date_column) = date_column {
            let key = |record: &crate::model::Record| {
                (
                    record.display("store_id").unwrap_or_default(),
                    record.display("product_id").unwrap_or_default(),
                    record.display(date_column).unwrap_or_default(),
                )
            };

            let mut counts: HashMap<(String, String, String), usize> = HashMap::new();
            for record in &batch.records {
                *counts.entry(key(record)).or_insert(0) += 1;
            }
            for (i, record) in batch.records.iter().enumerate() {
                if counts[&key(record)] > 1 {
                    if !flagged[i] {
                        reasons[i] = Some(DUPLICATE_ENTRY.to_string());
                    }
                    flagged[i] = true;
                }
            }
        }
    }

    let mut partition = Partition::default();
    for ((record, flagged), reason) in batch
        .records
        .into_iter()
        .zip(flagged)
        .zip(reasons)
    {
        if flagged {
            partition.quarantine.push(QuarantinedRecord {
                record,
                quarantine_reason: reason.unwrap_or_default(),
            });
        } else {
            partition.valid.push(record);
        }
    }
    partition
}
