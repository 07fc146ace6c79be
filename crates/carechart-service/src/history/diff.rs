//! Shallow field-level comparison of two snapshots.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::snapshot::Snapshot;

/// One top-level field whose value differs between two snapshots.
///
/// A `None` side means the field is absent there, which is distinct from a
/// JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Compare two snapshots field by field, sorted by field name.
///
/// Values are compared by deep equality, but nested objects are reported
/// whole rather than descended into.
pub fn diff(before: Option<&Snapshot>, after: Option<&Snapshot>) -> Vec<FieldChange> {
    let fields: BTreeSet<&String> = before
        .into_iter()
        .flat_map(Snapshot::fields)
        .chain(after.into_iter().flat_map(Snapshot::fields))
        .collect();

    fields
        .into_iter()
        .filter_map(|field| {
            let old_value = before.and_then(|s| s.get(field));
            let new_value = after.and_then(|s| s.get(field));
            (old_value != new_value).then(|| FieldChange {
                field: field.clone(),
                old_value: old_value.cloned(),
                new_value: new_value.cloned(),
            })
        })
        .collect()
}
