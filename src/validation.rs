//! Input validation for department and user records
//!
//! Checks every record before the sync touches the remote service: required
//! fields present and identifiers unique. All problems in a file are reported
//! together. Row numbers are 1-based with the header as row 1, so they match
//! what a spreadsheet shows.

use std::collections::BTreeMap;

use crate::error::{Result, SyncError};
use crate::models::{DepartmentRecord, UserRecord};

/// Row number of the record at `index` (the header occupies row 1).
pub fn row_number(index: usize) -> usize {
    index + 2
}

/// Validates department records
pub fn validate_departments(records: &[DepartmentRecord]) -> Result<()> {
    let mut problems = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let row = row_number(index);
        if record.external_id.is_empty() {
            problems.push(format!("row {row}: external_id is required"));
        }
        if record.name.is_empty() {
            problems.push(format!("row {row}: name is required"));
        }
    }

    problems.extend(duplicates(
        records.iter().map(|r| r.external_id.as_str()),
        "external_id",
    ));

    finish("departments", problems)
}

/// Validates user records
pub fn validate_users(records: &[UserRecord]) -> Result<()> {
    let mut problems = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let row = row_number(index);
        let required = [
            ("nickname", record.nickname.as_str()),
            ("first", record.first.as_str()),
            ("last", record.last.as_str()),
            ("dept_external_id", record.dept_external_id.as_str()),
        ];
        for (field, value) in required {
            if value.is_empty() {
                problems.push(format!("row {row}: {field} is required"));
            }
        }
    }

    problems.extend(duplicates(
        records.iter().map(|r| r.nickname.as_str()),
        "nickname",
    ));

    finish("users", problems)
}

/// One message per duplicated non-empty value, sorted by value.
fn duplicates<'a>(values: impl Iterator<Item = &'a str>, field: &str) -> Vec<String> {
    let mut rows: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, value) in values.enumerate() {
        if !value.is_empty() {
            rows.entry(value).or_default().push(row_number(index));
        }
    }

    rows.into_iter()
        .filter(|(_, rows)| rows.len() > 1)
        .map(|(value, rows)| {
            let rows: Vec<String> = rows.iter().map(ToString::to_string).collect();
            format!("duplicate {field} '{value}' in rows {}", rows.join(", "))
        })
        .collect()
}

fn finish(kind: &str, problems: Vec<String>) -> Result<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(SyncError::validation(format!(
            "invalid {kind}: {}",
            problems.join("; ")
        )))
    }
}
