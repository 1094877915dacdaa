//! Fuzzy recovery of quarantined records with corrupted identifiers.
//!
//! Only records quarantined as "Unknown Product ID" are candidates;
//! records held for any other reason stay in quarantine for manual
//! review. Matching runs over identifier strings, not product names —
//! corrupted identifiers are assumed to be character-level typos of
//! valid identifiers.

use crate::model::{MasterCatalog, QuarantinedRecord, Recovery, Value};
use crate::validate::UNKNOWN_PRODUCT_ID;

/// Minimum similarity score for an automated correction. Inclusive: a
/// score of exactly 90 is accepted.
pub const ACCEPT_SCORE: u32 = 90;

/// Normalized edit similarity in [0, 100], 100 = identical. With `d` the
/// Levenshtein distance and `n` the summed character lengths, the score is
/// `100 * (n - d) / n` rounded half up, in integer arithmetic. One
/// substitution between two 5-character identifiers scores exactly 90.
pub fn similarity(a: &str, b: &str) -> u32 {
    let n = a.chars().count() + b.chars().count();
    if n == 0 {
        return 100;
    }
    let d = strsim::levenshtein(a, b);
    (((n - d) * 200 + n) / (2 * n)) as u32
}

/// Built once per run from the master catalog. Candidate identifiers are
/// iterated in lexicographic order, so ties on the top score resolve to
/// the lexicographically first identifier.
pub struct Reconciler {
    master_ids: Vec<String>,
}

impl Reconciler {
    pub fn new(catalog: &MasterCatalog) -> Self {
        Self {
            master_ids: catalog.ids().map(String::from).collect(),
        }
    }

    /// Recover what can be recovered. Returns only accepted corrections;
    /// the quarantine batch itself is never modified, so the ledger keeps
    /// every original entry (append-only, historical).
    pub fn reconcile(&self, quarantine: &[QuarantinedRecord]) -> Vec<Recovery> {
        let mut recovered = Vec::new();

        for entry in quarantine {
            if entry.quarantine_reason != UNKNOWN_PRODUCT_ID {
                continue;
            }
            let Some(bad_id) = entry.record.display("product_id") else {
                continue;
            };

            let mut best: Option<(&str, u32)> = None;
            for id in &self.master_ids {
                let score = similarity(&bad_id, id);
                // Strict > keeps the first (lexicographically smallest) of
                // equally-scored candidates.
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((id, score));
                }
            }

            let Some((master_id, score)) = best else {
                continue;
            };
            if score < ACCEPT_SCORE {
                continue;
            }

            let note = format!(
                "Fixed (Fuzzy Match: {bad_id} -> {master_id}, Score: {score})"
            );
            let record = entry
                .record
                .with_field("product_id", Value::Text(master_id.to_string()))
                .with_note(note);

            recovered.push(Recovery {
                record,
                original_id: bad_id,
                corrected_id: master_id.to_string(),
                score,
            });
        }

        recovered
    }
}
