//! Field-level change detection for edit forms.
//!
//! Edit screens are pre-filled from a detail fetch; on submit only fields
//! whose serialized value differs from that baseline are sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The status of a field in a baseline-vs-draft comparison.
///
/// - `Added`     -- present only in the draft.
/// - `Removed`   -- present only in the baseline.
/// - `Changed`   -- present in both with different values.
/// - `Unchanged` -- present in both with identical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One compared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff {
    pub field: String,
    pub status: DiffStatus,
    pub value: Value,
}

/// Compare two serialized objects key by key.
///
/// Non-object inputs are treated as empty objects.
pub fn diff_fields(baseline: &Value, draft: &Value) -> Vec<FieldDiff> {
    let empty = Map::new();
    let old = baseline.as_object().unwrap_or(&empty);
    let new = draft.as_object().unwrap_or(&empty);

    let mut out = Vec::with_capacity(old.len().max(new.len()));
    for (field, value) in new {
        let status = match old.get(field) {
            None => DiffStatus::Added,
            Some(prev) if prev == value => DiffStatus::Unchanged,
            Some(_) => DiffStatus::Changed,
        };
        out.push(FieldDiff {
            field: field.clone(),
            status,
            value: value.clone(),
        });
    }
    for (field, value) in old {
        if !new.contains_key(field) {
            out.push(FieldDiff {
                field: field.clone(),
                status: DiffStatus::Removed,
                value: value.clone(),
            });
        }
    }
    out
}

/// The draft fields that differ from the baseline, ready to be PATCHed.
pub fn changed_fields(baseline: &Value, draft: &Value) -> Map<String, Value> {
    diff_fields(baseline, draft)
        .into_iter()
        .filter(|d| matches!(d.status, DiffStatus::Added | DiffStatus::Changed))
        .map(|d| (d.field, d.value))
        .collect()
}
