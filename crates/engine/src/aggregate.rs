//! Effective-stock aggregation: merge validated snapshot, restock, and
//! damage records into one fact row per (store, product).
//!
//! Left join anchored on snapshots: keys with restock or damage activity
//! but no snapshot never produce a fact row; keys with no activity get 0,
//! not null. Effective stock is not floored — a negative value is a valid
//! (if alarming) business signal.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::engine::{DATASET_DAMAGE, DATASET_RESTOCK, DATASET_SNAPSHOT};
use crate::error::PipelineError;
use crate::model::{FactRow, Record, Value};

fn required_text(
    record: &Record,
    dataset: &str,
    column: &str,
) -> Result<String, PipelineError> {
    record
        .display(column)
        .ok_or_else(|| PipelineError::MissingColumn {
            dataset: dataset.into(),
            column: column.into(),
        })
}

fn required_int(record: &Record, dataset: &str, column: &str) -> Result<i64, PipelineError> {
    match record.get(column) {
        Some(Value::Int(n)) => Ok(*n),
        Some(other) => Err(PipelineError::BadField {
            dataset: dataset.into(),
            column: column.into(),
            value: other.to_string(),
        }),
        None => Err(PipelineError::MissingColumn {
            dataset: dataset.into(),
            column: column.into(),
        }),
    }
}

fn required_date(
    record: &Record,
    dataset: &str,
    column: &str,
) -> Result<NaiveDate, PipelineError> {
    match record.get(column) {
        Some(Value::Date(d)) => Ok(*d),
        Some(other) => Err(PipelineError::BadField {
            dataset: dataset.into(),
            column: column.into(),
            value: other.to_string(),
        }),
        None => Err(PipelineError::MissingColumn {
            dataset: dataset.into(),
            column: column.into(),
        }),
    }
}

type Key = (String, String);

/// Stable-sort snapshots by date ascending and keep the last record per
/// (store, product): the last input row carrying the maximum date wins.
fn latest_snapshots(
    snapshots: &[Record],
) -> Result<BTreeMap<Key, (NaiveDate, &Record)>, PipelineError> {
    let mut dated: Vec<(NaiveDate, &Record)> = Vec::with_capacity(snapshots.len());
    for record in snapshots {
        dated.push((required_date(record, DATASET_SNAPSHOT, "date")?, record));
    }
    dated.sort_by_key(|(date, _)| *date);

    let mut latest: BTreeMap<Key, (NaiveDate, &Record)> = BTreeMap::new();
    for (date, record) in dated {
        let key = (
            required_text(record, DATASET_SNAPSHOT, "store_id")?,
            required_text(record, DATASET_SNAPSHOT, "product_id")?,
        );
        latest.insert(key, (date, record));
    }
    Ok(latest)
}

/// Group by (store, product) and sum one quantity column.
fn sum_by_key(
    records: &[Record],
    dataset: &str,
    qty_column: &str,
) -> Result<BTreeMap<Key, i64>, PipelineError> {
    let mut sums: BTreeMap<Key, i64> = BTreeMap::new();
    for record in records {
        let key = (
            required_text(record, dataset, "store_id")?,
            required_text(record, dataset, "product_id")?,
        );
        *sums.entry(key).or_insert(0) += required_int(record, dataset, qty_column)?;
    }
    Ok(sums)
}

/// One fact row per snapshotted (store, product), in key order.
pub fn aggregate(
    snapshots: &[Record],
    restocks: &[Record],
    damages: &[Record],
) -> Result<Vec<FactRow>, PipelineError> {
    let latest = latest_snapshots(snapshots)?;
    let restock_sums = sum_by_key(restocks, DATASET_RESTOCK, "restock_qty")?;
    let damage_sums = sum_by_key(damages, DATASET_DAMAGE, "damaged_qty")?;

    let mut facts = Vec::with_capacity(latest.len());
    for ((store_id, product_id), (date, record)) in latest {
        let quantity = required_int(record, DATASET_SNAPSHOT, "quantity")?;
        let key = (store_id.clone(), product_id.clone());
        let restock_qty = restock_sums.get(&key).copied().unwrap_or(0);
        let damaged_qty = damage_sums.get(&key).copied().unwrap_or(0);

        facts.push(FactRow {
            store_id,
            product_id,
            date,
            quantity,
            restock_qty,
            damaged_qty,
            effective_stock: quantity + restock_qty - damaged_qty,
            note: record.note.clone(),
        });
    }
    Ok(facts)
}
