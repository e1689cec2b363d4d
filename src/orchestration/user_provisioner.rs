//! # User Provisioner
//!
//! Creates users one at a time, each placed in a department resolved during
//! the same run. A conflict on create means the user already exists; it is
//! reported and processing moves on. Consecutive create calls are spaced by a
//! fixed pause to stay under the service's rate limit.

use std::sync::Arc;
use std::time::Duration;

use crate::client::{CreateOutcome, DirectoryApi};
use crate::constants::{pacing, UserStatus};
use crate::error::{Result, SyncError};
use crate::logging::log_user_operation;
use crate::models::{NewUser, UserRecord};
use crate::orchestration::types::{ExternalIdMap, UserResult};
use crate::resilience::{Sleeper, TokioSleeper};

#[derive(Debug)]
pub struct UserProvisioner<'a, A: ?Sized> {
    api: &'a A,
    pause: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl<'a, A> UserProvisioner<'a, A>
where
    A: DirectoryApi + ?Sized,
{
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            pause: Duration::from_millis(pacing::DEFAULT_USER_PAUSE_MS),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    #[must_use]
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Create every user in input order.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnresolvedDepartment`] as soon as a user names a department
    /// that was not resolved in this run (users before it stay created). Any
    /// non-conflict failure of a create call is returned unchanged.
    pub async fn provision_all(
        &self,
        users: &[UserRecord],
        departments: &ExternalIdMap,
    ) -> Result<Vec<UserResult>> {
        let mut results = Vec::with_capacity(users.len());

        for (index, user) in users.iter().enumerate() {
            let department_id = departments.get(&user.dept_external_id).ok_or_else(|| {
                SyncError::UnresolvedDepartment {
                    nickname: user.nickname.clone(),
                    dept_external_id: user.dept_external_id.clone(),
                }
            })?;

            if index > 0 && !self.pause.is_zero() {
                self.sleeper.sleep(self.pause).await;
            }

            results.push(self.provision(user, department_id).await?);
        }

        Ok(results)
    }

    /// Create one user in the department with remote id `department_id`.
    pub async fn provision(&self, user: &UserRecord, department_id: &str) -> Result<UserResult> {
        let new_user = NewUser::from_record(user, department_id);

        let result = match self.api.create_user(&new_user).await? {
            CreateOutcome::Created(created) => UserResult {
                nickname: user.nickname.clone(),
                status: UserStatus::Created,
                id: Some(created.id),
            },
            CreateOutcome::Conflict { .. } => UserResult {
                nickname: user.nickname.clone(),
                status: UserStatus::Exists,
                id: None,
            },
        };

        log_user_operation(
            "create_user",
            &user.nickname,
            Some(department_id),
            result.status.as_str(),
            result.id.as_deref(),
        );
        Ok(result)
    }
}
