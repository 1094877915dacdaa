use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A single typed cell. Ingestion parses dates first, then integers,
/// then falls back to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Date(NaiveDate),
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of a dataset: an ordered mapping of named fields.
///
/// Records are immutable once built. Stages that change a record (the
/// Reconciler's identifier correction) construct a new one instead of
/// mutating in place, so no hidden order-dependence exists between checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
    /// Audit note attached by the Reconciler on recovered records;
    /// absent everywhere else. Carried through to the fact table.
    pub note: Option<String>,
}

impl Record {
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self { fields, note: None }
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Field value rendered as a string, for key building and diagnostics.
    pub fn display(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name) {
            Some(Value::Date(d)) => Some(*d),
            _ => None,
        }
    }

    /// New record with one field replaced (or appended if absent).
    pub fn with_field(&self, name: &str, value: Value) -> Self {
        let mut fields = self.fields.clone();
        match fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => fields.push((name.to_string(), value)),
        }
        Self {
            fields,
            note: self.note.clone(),
        }
    }

    /// New record with an audit note attached.
    pub fn with_note(&self, note: impl Into<String>) -> Self {
        Self {
            fields: self.fields.clone(),
            note: Some(note.into()),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.note.is_some());
        let mut map = serializer.serialize_map(Some(self.fields.len() + extra))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        if let Some(ref note) = self.note {
            map.serialize_entry("note", note)?;
        }
        map.end()
    }
}

/// One dataset file's contents: ordered column schema + ordered records.
#[derive(Debug, Clone, Serialize)]
pub struct RecordBatch {
    pub dataset: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordBatch {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Master catalog
// ---------------------------------------------------------------------------

/// Product identifier → product name. Defines the set of identifiers
/// considered valid foreign keys. Kept sorted so candidate iteration order
/// (and therefore fuzzy tie-breaking) is lexicographic and reproducible.
#[derive(Debug, Clone, Default)]
pub struct MasterCatalog {
    products: BTreeMap<String, String>,
}

impl MasterCatalog {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            products: pairs
                .into_iter()
                .map(|(id, name)| (id.into(), name.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.products.insert(id.into(), name.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.products.contains_key(id)
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.products.get(id).map(String::as_str)
    }

    /// Identifiers in lexicographic order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// A record held back by validation, with the reason that survived the
/// check sequence. The reason lives here, not on the record.
#[derive(Debug, Clone, Serialize)]
pub struct QuarantinedRecord {
    pub record: Record,
    pub quarantine_reason: String,
}

/// Validator output: every input record lands in exactly one side.
#[derive(Debug, Default)]
pub struct Partition {
    pub valid: Vec<Record>,
    pub quarantine: Vec<QuarantinedRecord>,
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

/// A quarantined record rescued by fuzzy identifier matching. `record` is a
/// new record with the corrected identifier and the audit note attached;
/// the original quarantine entry is untouched.
#[derive(Debug, Clone, Serialize)]
pub struct Recovery {
    pub record: Record,
    pub original_id: String,
    pub corrected_id: String,
    pub score: u32,
}

// ---------------------------------------------------------------------------
// Fact table
// ---------------------------------------------------------------------------

/// One consolidated effective-stock fact per (store, product).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRow {
    pub store_id: String,
    pub product_id: String,
    pub date: NaiveDate,
    pub quantity: i64,
    pub restock_qty: i64,
    pub damaged_qty: i64,
    pub effective_stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DatasetCounts {
    pub total: usize,
    pub valid: usize,
    pub quarantined: usize,
    pub recovered: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub datasets: BTreeMap<String, DatasetCounts>,
    pub total_records: usize,
    pub total_valid: usize,
    pub total_quarantined: usize,
    pub total_recovered: usize,
    pub fact_rows: usize,
}

impl RunSummary {
    /// Quarantined records that no recovery rescued — the ledger entries
    /// still pending manual review.
    pub fn residual_quarantine(&self) -> usize {
        self.total_quarantined.saturating_sub(self.total_recovered)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub facts: Vec<FactRow>,
    pub ledger: Vec<QuarantinedRecord>,
}
