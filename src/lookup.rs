//! Typed lookup values built from raw rows.
use crate::rows::RawRow;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRowError {
    #[error("row {row} has {found} columns, expected {expected}")]
    MissingColumns {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("row {row} has non-integer id {value:?}")]
    InvalidId { row: usize, value: String },
}

/// One row of a flat lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupValue {
    pub id: i64,
    pub description: String,
}

/// One row of a hierarchical lookup view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupValueWithParent {
    pub id: i64,
    pub description: String,
    pub parent: String,
}

/// Rows sharing one parent value, in first-occurrence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentGroup {
    pub parent: String,
    pub values: Vec<LookupValue>,
}

/// Descriptions appearing more than once within a grouping scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub description: String,
    pub ids: Vec<i64>,
}

fn check_columns(idx: usize, row: &RawRow, expected: usize) -> Result<(), MalformedRowError> {
    if row.len() < expected {
        return Err(MalformedRowError::MissingColumns {
            row: idx + 1,
            found: row.len(),
            expected,
        });
    }
    Ok(())
}

fn parse_id(idx: usize, raw: &str) -> Result<i64, MalformedRowError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| MalformedRowError::InvalidId {
            row: idx + 1,
            value: raw.to_string(),
        })
}

/// Build flat values from `(id, description)` rows, keeping row order.
pub fn values_from_rows(rows: &[RawRow]) -> Result<Vec<LookupValue>, MalformedRowError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            check_columns(idx, row, 2)?;
            Ok(LookupValue {
                id: parse_id(idx, &row[0])?,
                description: row[1].trim().to_string(),
            })
        })
        .collect()
}

/// Build hierarchical values from `(id, description, parent)` rows, keeping row order.
pub fn values_with_parent_from_rows(
    rows: &[RawRow],
) -> Result<Vec<LookupValueWithParent>, MalformedRowError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            check_columns(idx, row, 3)?;
            Ok(LookupValueWithParent {
                id: parse_id(idx, &row[0])?,
                description: row[1].trim().to_string(),
                parent: row[2].trim().to_string(),
            })
        })
        .collect()
}

/// Split values into one group per distinct parent, ordered by first appearance.
pub fn group_by_parent(values: Vec<LookupValueWithParent>) -> Vec<ParentGroup> {
    let mut groups: Vec<ParentGroup> = Vec::new();
    for value in values {
        let entry = LookupValue {
            id: value.id,
            description: value.description,
        };
        match groups.iter_mut().find(|group| group.parent == value.parent) {
            Some(group) => group.values.push(entry),
            None => groups.push(ParentGroup {
                parent: value.parent,
                values: vec![entry],
            }),
        }
    }
    groups
}

/// Report each description used by more than one value, in first-occurrence order.
pub fn duplicate_descriptions(values: &[LookupValue]) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for value in values {
        match groups
            .iter_mut()
            .find(|group| group.description == value.description)
        {
            Some(group) => group.ids.push(value.id),
            None => groups.push(DuplicateGroup {
                description: value.description.clone(),
                ids: vec![value.id],
            }),
        }
    }
    groups.retain(|group| group.ids.len() > 1);
    groups
}
