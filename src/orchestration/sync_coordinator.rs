//! # Sync Coordinator
//!
//! Drives one full synchronization run:
//!
//! 1. resolve the department creation order (a cycle aborts before any call),
//! 2. snapshot the remote departments,
//! 3. converge departments parents-first,
//! 4. refresh the snapshot,
//! 5. create users, paced.
//!
//! Every step runs to completion before the next starts. The first fatal
//! error ends the run; everything already created stays created, and running
//! the sync again picks up where it stopped without duplicating anything.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::client::DirectoryApi;
use crate::config::SyncConfig;
use crate::constants::pacing;
use crate::error::{Result, SyncError};
use crate::logging::log_error;
use crate::models::{DepartmentRecord, UserRecord};
use crate::orchestration::department_cache::DepartmentCache;
use crate::orchestration::department_upserter::DepartmentUpserter;
use crate::orchestration::hierarchy_resolver::resolve_creation_order;
use crate::orchestration::types::{
    DryRunPlan, PlannedDepartment, PlannedUser, SyncReport, SyncSummary,
};
use crate::orchestration::user_provisioner::UserProvisioner;
use crate::resilience::{Sleeper, TokioSleeper};

/// Runs department and user synchronization against one directory
#[derive(Debug)]
pub struct SyncCoordinator<A> {
    api: A,
    user_pause: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl<A: DirectoryApi> SyncCoordinator<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            user_pause: Duration::from_millis(pacing::DEFAULT_USER_PAUSE_MS),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Coordinator with the user pause taken from configuration.
    pub fn from_config(api: A, config: &SyncConfig) -> Self {
        Self::new(api).with_user_pause(Duration::from_millis(config.user_pause_ms))
    }

    #[must_use]
    pub fn with_user_pause(mut self, pause: Duration) -> Self {
        self.user_pause = pause;
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run a full sync and report what happened to every record.
    pub async fn run(
        &self,
        departments: &[DepartmentRecord],
        users: &[UserRecord],
    ) -> Result<SyncReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("sync_run", run_id = %run_id);

        let result = self.execute(run_id, departments, users).instrument(span).await;
        if let Err(e) = &result {
            log_error("sync_coordinator", "run", &e.to_string(), Some(&run_id.to_string()));
        }
        result
    }

    async fn execute(
        &self,
        run_id: Uuid,
        departments: &[DepartmentRecord],
        users: &[UserRecord],
    ) -> Result<SyncReport> {
        let started_at = Utc::now();
        info!(
            departments = departments.len(),
            users = users.len(),
            "🚀 Starting directory sync"
        );

        let ordered = resolve_creation_order(departments)?;

        let mut cache = DepartmentCache::new();
        cache.refresh(&self.api).await?;

        let (mapping, department_results) = DepartmentUpserter::new(&self.api)
            .upsert_all(&mut cache, &ordered)
            .await?;

        // Users only start once the department tree is settled and re-read
        cache.refresh(&self.api).await?;

        let user_results = UserProvisioner::new(&self.api)
            .with_pause(self.user_pause)
            .with_sleeper(Arc::clone(&self.sleeper))
            .provision_all(users, &mapping)
            .await?;

        let summary = SyncSummary::from_results(&department_results, &user_results);
        let report = SyncReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            departments: department_results,
            users: user_results,
            summary,
        };

        info!(
            duration_ms = report.duration_ms(),
            departments_created = report.summary.departments_created,
            departments_adopted = report.summary.departments_adopted,
            users_created = report.summary.users_created,
            users_existing = report.summary.users_existing,
            "🎉 Directory sync completed"
        );
        Ok(report)
    }
}

/// Compute what a live run would attempt, without touching the remote service.
///
/// Applies the same ordering and user placement checks as [`SyncCoordinator::run`],
/// so a plan that builds cleanly fails a live run only on remote-side problems.
pub fn plan_dry_run(departments: &[DepartmentRecord], users: &[UserRecord]) -> Result<DryRunPlan> {
    let ordered = resolve_creation_order(departments)?;
    let in_input: HashSet<&str> = departments.iter().map(|d| d.external_id.as_str()).collect();

    let planned_departments = ordered
        .iter()
        .map(|record| PlannedDepartment {
            external_id: record.external_id.clone(),
            name: record.name.clone(),
            parent_external_id: record.parent().map(str::to_string),
            parent_outside_input: record.parent().is_some_and(|p| !in_input.contains(p)),
        })
        .collect();

    let planned_users = users
        .iter()
        .map(|user| {
            if in_input.contains(user.dept_external_id.as_str()) {
                Ok(PlannedUser {
                    nickname: user.nickname.clone(),
                    first: user.first.clone(),
                    last: user.last.clone(),
                    dept_external_id: user.dept_external_id.clone(),
                })
            } else {
                Err(SyncError::UnresolvedDepartment {
                    nickname: user.nickname.clone(),
                    dept_external_id: user.dept_external_id.clone(),
                })
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DryRunPlan {
        departments: planned_departments,
        users: planned_users,
    })
}
