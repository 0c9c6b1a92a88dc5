//! Schema-tolerant comparison of two tables.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::DataTable;

/// Which table a difference refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Expected,
    Actual,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => f.write_str("expected"),
            Self::Actual => f.write_str("actual"),
        }
    }
}

/// One difference between an expected and an actual table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableDifference {
    /// A field of the expected table is absent from the actual one.
    MissingField { name: String, key: bool },
    /// A field only the actual table has.
    ExtraField { name: String, key: bool },
    /// A field is a key in one table and a value field in the other.
    KeyMismatch { name: String, key_in_expected: bool },
    /// More than one row of a table carries the same key.
    DuplicateKey { side: Side, key: Vec<String> },
    /// Aligned rows disagree on a cell.
    Cell {
        row: usize,
        key: Option<Vec<String>>,
        field: String,
        expected: String,
        actual: String,
    },
    MissingRows { count: usize },
    ExtraRows { count: usize },
}

impl fmt::Display for TableDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = |key: bool| if key { "key field" } else { "field" };
        match self {
            Self::MissingField { name, key } => write!(f, "missing {} {name}", kind(*key)),
            Self::ExtraField { name, key } => write!(f, "unexpected {} {name}", kind(*key)),
            Self::KeyMismatch {
                name,
                key_in_expected: true,
            } => write!(f, "{name} is a key field in expected but not in actual"),
            Self::KeyMismatch { name, .. } => {
                write!(f, "{name} is a key field in actual but not in expected")
            }
            Self::DuplicateKey { side, key } => {
                write!(f, "duplicate key [{}] in {side} table", key.join(", "))
            }
            Self::Cell {
                row,
                key,
                field,
                expected,
                actual,
            } => {
                write!(f, "row {row}")?;
                if let Some(key) = key {
                    write!(f, " [{}]", key.join(", "))?;
                }
                write!(f, " {field}: expected {expected:?}, found {actual:?}")
            }
            Self::MissingRows { count } => write!(f, "{count} row(s) missing"),
            Self::ExtraRows { count } => write!(f, "{count} unexpected row(s)"),
        }
    }
}

/// Compare `actual` against `expected`.
///
/// Rows are aligned by the tuple of key fields both tables share when the
/// tables agree on which of their common fields are keys; otherwise rows
/// are aligned by position. Expected rows without a counterpart are not
/// cell-compared, but are reflected in the row count check.
pub fn diff_tables(expected: &DataTable, actual: &DataTable) -> Vec<TableDifference> {
    let mut differences = Vec::new();

    for name in expected.columns() {
        if !actual.has_field(name) {
            differences.push(TableDifference::MissingField {
                name: name.to_string(),
                key: expected.is_key(name),
            });
        }
    }
    for name in actual.columns() {
        if !expected.has_field(name) {
            differences.push(TableDifference::ExtraField {
                name: name.to_string(),
                key: actual.is_key(name),
            });
        }
    }

    let common: Vec<&str> = expected.columns().filter(|c| actual.has_field(c)).collect();
    let mut keys_agree = true;
    for name in &common {
        if expected.is_key(name) != actual.is_key(name) {
            keys_agree = false;
            differences.push(TableDifference::KeyMismatch {
                name: name.to_string(),
                key_in_expected: expected.is_key(name),
            });
        }
    }
    let shared_keys: Vec<&str> = common
        .iter()
        .copied()
        .filter(|c| expected.is_key(c))
        .collect();

    let pairs: Vec<(usize, usize)> = if keys_agree && !shared_keys.is_empty() {
        align_by_key(expected, actual, &shared_keys, &mut differences)
    } else {
        debug!(keys_agree, "aligning rows by position");
        (0..expected.len().min(actual.len())).map(|i| (i, i)).collect()
    };

    for (e, a) in pairs {
        let key = (keys_agree && !shared_keys.is_empty()).then(|| key_of(expected, e, &shared_keys));
        for field in &common {
            let (Some(x), Some(y)) = (expected.cell(e, field), actual.cell(a, field)) else {
                continue;
            };
            if x != y {
                differences.push(TableDifference::Cell {
                    row: e,
                    key: key.clone(),
                    field: field.to_string(),
                    expected: x.to_string(),
                    actual: y.to_string(),
                });
            }
        }
    }

    if expected.len() > actual.len() {
        differences.push(TableDifference::MissingRows {
            count: expected.len() - actual.len(),
        });
    } else if actual.len() > expected.len() {
        differences.push(TableDifference::ExtraRows {
            count: actual.len() - expected.len(),
        });
    }
    differences
}

fn key_of(table: &DataTable, row: usize, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .map(|k| table.cell(row, k).unwrap_or_default().to_string())
        .collect()
}

/// Pair each expected row with the first actual row carrying its key.
fn align_by_key(
    expected: &DataTable,
    actual: &DataTable,
    keys: &[&str],
    differences: &mut Vec<TableDifference>,
) -> Vec<(usize, usize)> {
    let index = |table: &DataTable, side: Side, differences: &mut Vec<TableDifference>| {
        let mut seen: HashMap<Vec<String>, usize> = HashMap::new();
        for row in 0..table.len() {
            let key = key_of(table, row, keys);
            if seen.contains_key(&key) {
                differences.push(TableDifference::DuplicateKey { side, key });
            } else {
                seen.insert(key, row);
            }
        }
        seen
    };
    let expected_rows = index(expected, Side::Expected, differences);
    let actual_rows = index(actual, Side::Actual, differences);

    let mut pairs: Vec<(usize, usize)> = expected_rows
        .iter()
        .filter_map(|(key, e)| actual_rows.get(key).map(|a| (*e, *a)))
        .collect();
    pairs.sort_unstable();
    pairs
}
