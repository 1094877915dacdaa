//! CSV decoding into record batches. Takes CSV text, not paths — file
//! discovery and reads happen at the caller's boundary.

use chrono::NaiveDate;

use crate::error::PipelineError;
use crate::model::{MasterCatalog, Record, RecordBatch, Value};

/// Parse one cell: date first, then integer, then text.
fn parse_value(cell: &str) -> Value {
    if let Ok(date) = NaiveDate::parse_from_str(cell, "%Y-%m-%d") {
        return Value::Date(date);
    }
    if let Ok(n) = cell.parse::<i64>() {
        return Value::Int(n);
    }
    Value::Text(cell.to_string())
}

/// Decode a dataset file's CSV text (header row required) into a batch.
pub fn parse_batch(dataset: &str, csv_text: &str) -> Result<RecordBatch, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::Csv {
            dataset: dataset.into(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| PipelineError::Csv {
            dataset: dataset.into(),
            message: e.to_string(),
        })?;
        let fields = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), parse_value(row.get(i).unwrap_or(""))))
            .collect();
        records.push(Record::new(fields));
    }

    Ok(RecordBatch {
        dataset: dataset.to_string(),
        columns,
        records,
    })
}

/// Decode the master product catalog. Requires `product_id` and
/// `product_name` columns; other columns are ignored.
pub fn parse_catalog(csv_text: &str) -> Result<MasterCatalog, PipelineError> {
    const DATASET: &str = "products";

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::Csv {
            dataset: DATASET.into(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, PipelineError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::MissingColumn {
                dataset: DATASET.into(),
                column: name.into(),
            })
    };

    let id_idx = idx("product_id")?;
    let name_idx = idx("product_name")?;

    let mut catalog = MasterCatalog::default();
    for row in reader.records() {
        let row = row.map_err(|e| PipelineError::Csv {
            dataset: DATASET.into(),
            message: e.to_string(),
        })?;
        catalog.insert(
            row.get(id_idx).unwrap_or(""),
            row.get(name_idx).unwrap_or(""),
        );
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_typed_by_content() {
        let csv = "\
date,store_id,product_id,quantity
2024-01-01,S000,P0005,50
2024-01-02,S001,P0007,-10
";
        let batch = parse_batch("inventory_snapshot", csv).unwrap();
        assert_eq!(batch.columns, vec!["date", "store_id", "product_id", "quantity"]);
        assert_eq!(batch.len(), 2);

        let first = &batch.records[0];
        assert_eq!(
            first.date("date"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(first.display("store_id").as_deref(), Some("S000"));
        assert_eq!(first.int("quantity"), Some(50));
        assert_eq!(batch.records[1].int("quantity"), Some(-10));
    }

    #[test]
    fn short_rows_padded_with_empty_text() {
        let csv = "a,b,c\n1,2\n";
        let batch = parse_batch("x", csv).unwrap();
        assert_eq!(batch.records[0].display("c").as_deref(), Some(""));
    }

    #[test]
    fn header_only_batch_is_empty() {
        let batch = parse_batch("x", "date,store_id\n").unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.columns.len(), 2);
    }

    #[test]
    fn catalog_parses_and_sorts() {
        let csv = "\
product_id,product_name,category,unit_price
P0002,lamp Home,Home,19.99
P0001,radio Electronics,Electronics,120.00
";
        let catalog = parse_catalog(csv).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name_of("P0001"), Some("radio Electronics"));
        let ids: Vec<&str> = catalog.ids().collect();
        assert_eq!(ids, vec!["P0001", "P0002"]);
    }

    #[test]
    fn catalog_requires_identifier_column() {
        let err = parse_catalog("name,price\nx,1\n").unwrap_err();
        assert!(err.to_string().contains("product_id"));
    }
}
