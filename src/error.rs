//! # Sync Error Types
//!
//! One error enum for the whole sync pipeline. Only transient remote failures
//! are recovered (inside the retry policy); every other variant aborts the run,
//! and re-running the sync is the recovery path.

use thiserror::Error;

use crate::constants::is_transient_status;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("{operation} failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Cycle detected in department hierarchy among: {}", members.join(", "))]
    CycleDetected { members: Vec<String> },

    #[error("Inconsistent remote state for department {external_id}: {detail}")]
    Inconsistency { external_id: String, detail: String },

    #[error("Failed to create department {external_id}: {source}")]
    DepartmentCreationFailed {
        external_id: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error("Department {dept_external_id} not found for user {nickname}")]
    UnresolvedDepartment {
        nickname: String,
        dept_external_id: String,
    },

    #[error("Parent {parent_external_id} was not resolved before {external_id}")]
    MissingParent {
        external_id: String,
        parent_external_id: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SyncError {
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether the retry policy should try the call again.
    ///
    /// Transient means an overload or momentary server status, or a transport
    /// failure that never produced a response (timeout, refused connection).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Api { status, .. } => is_transient_status(*status),
            SyncError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Api { status, .. } => Some(*status),
            SyncError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
