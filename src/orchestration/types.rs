//! # Orchestration Types
//!
//! Data carried between the sync phases and returned to the caller: the
//! external-id to remote-id mapping built while departments converge, the
//! per-record results, the run report and the dry-run plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::constants::{DepartmentOutcome, UserStatus};

/// Append-only mapping from department external id to remote id
///
/// Populated in creation order during a run and consulted for parent links and
/// user placement. An entry, once written, is never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExternalIdMap {
    entries: HashMap<String, String>,
}

impl ExternalIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mapping. Returns `false` (and keeps the first value) when the
    /// external id is already mapped.
    pub fn insert(&mut self, external_id: impl Into<String>, remote_id: impl Into<String>) -> bool {
        let external_id = external_id.into();
        if self.entries.contains_key(&external_id) {
            return false;
        }
        self.entries.insert(external_id, remote_id.into());
        true
    }

    pub fn get(&self, external_id: &str) -> Option<&str> {
        self.entries.get(external_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Converged state of one department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentResult {
    pub external_id: String,
    pub remote_id: String,
    pub outcome: DepartmentOutcome,
}

/// Result of one user creation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResult {
    pub nickname: String,
    pub status: UserStatus,
    /// Remote id, known only when this run created the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Aggregate counts for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub departments_total: usize,
    pub departments_existing: usize,
    pub departments_adopted: usize,
    pub departments_created: usize,
    pub departments_resolved_after_conflict: usize,
    pub users_total: usize,
    pub users_created: usize,
    pub users_existing: usize,
}

impl SyncSummary {
    pub fn from_results(departments: &[DepartmentResult], users: &[UserResult]) -> Self {
        let mut summary = Self {
            departments_total: departments.len(),
            users_total: users.len(),
            ..Self::default()
        };

        for result in departments {
            match result.outcome {
                DepartmentOutcome::Existing => summary.departments_existing += 1,
                DepartmentOutcome::Adopted => summary.departments_adopted += 1,
                DepartmentOutcome::Created | DepartmentOutcome::CreatedAfterFailedAdoption => {
                    summary.departments_created += 1;
                }
                DepartmentOutcome::ResolvedAfterConflict => {
                    summary.departments_resolved_after_conflict += 1;
                }
            }
        }

        for result in users {
            match result.status {
                UserStatus::Created => summary.users_created += 1,
                UserStatus::Exists => summary.users_existing += 1,
            }
        }

        summary
    }
}

/// Everything a completed run did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub departments: Vec<DepartmentResult>,
    pub users: Vec<UserResult>,
    pub summary: SyncSummary,
}

impl SyncReport {
    /// Number of departments whose processing changed remote state.
    ///
    /// A department resolved after a conflict is not counted: its create call
    /// was refused and another actor's department was reused.
    pub fn department_mutations(&self) -> usize {
        self.departments
            .iter()
            .filter(|d| d.outcome.mutated_remote())
            .count()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// A department as it would be processed, in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedDepartment {
    pub external_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_external_id: Option<String>,
    /// Whether the parent is expected to exist remotely rather than in this input.
    #[serde(default)]
    pub parent_outside_input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedUser {
    pub nickname: String,
    pub first: String,
    pub last: String,
    pub dept_external_id: String,
}

/// What a live run would attempt, computed without any remote call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunPlan {
    pub departments: Vec<PlannedDepartment>,
    pub users: Vec<PlannedUser>,
}
