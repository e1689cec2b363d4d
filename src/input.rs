//! # CSV Input
//!
//! Loads department and user records from CSV files with a header row.
//! Header names and values are trimmed; blank optional cells become `None`.
//! Loaded records are validated before they are returned.
//!
//! A file that cannot be opened surfaces as [`SyncError::Io`]; a malformed row
//! surfaces as [`SyncError::Csv`], whose position carries the 1-based line.
//!
//! [`SyncError::Io`]: crate::error::SyncError::Io
//! [`SyncError::Csv`]: crate::error::SyncError::Csv

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::models::{DepartmentRecord, UserRecord};
use crate::validation::{validate_departments, validate_users};

pub fn load_departments(path: &Path) -> Result<Vec<DepartmentRecord>> {
    let records = read_records(File::open(path)?)?;
    validate_departments(&records)?;
    info!(path = %path.display(), count = records.len(), "📄 Loaded department records");
    Ok(records)
}

pub fn load_users(path: &Path) -> Result<Vec<UserRecord>> {
    let records = read_records(File::open(path)?)?;
    validate_users(&records)?;
    info!(path = %path.display(), count = records.len(), "📄 Loaded user records");
    Ok(records)
}

/// Parse department records from any reader (no validation).
pub fn read_departments<R: Read>(reader: R) -> Result<Vec<DepartmentRecord>> {
    read_records(reader)
}

/// Parse user records from any reader (no validation).
pub fn read_users<R: Read>(reader: R) -> Result<Vec<UserRecord>> {
    read_records(reader)
}

fn read_records<T, R>(reader: R) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = csv_reader.deserialize().collect::<csv::Result<Vec<T>>>()?;
    Ok(records)
}
