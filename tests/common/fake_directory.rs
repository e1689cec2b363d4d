//! In-memory directory service for workflow tests
//!
//! Behaves like the real service where it matters: paginated listing, a
//! conflict on duplicate department external ids or user nicknames, and
//! persistent state across sync runs. Failures and races can be injected per
//! external id, and every call is counted.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use orgsync::client::{CreateOutcome, DirectoryApi};
use orgsync::models::{
    DepartmentPage, DepartmentPatch, NewDepartment, NewUser, RemoteDepartment, RemoteUser,
};
use orgsync::resilience::Sleeper;
use orgsync::{Result, SyncError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub list_pages: usize,
    pub create_department: usize,
    pub update_department: usize,
    pub create_user: usize,
}

impl CallCounts {
    /// Calls that change remote state.
    pub fn mutations(&self) -> usize {
        self.create_department + self.update_department + self.create_user
    }
}

#[derive(Debug, Default)]
struct State {
    departments: Vec<RemoteDepartment>,
    users: Vec<RemoteUser>,
    next_id: u64,
    calls: CallCounts,
    created_departments: Vec<NewDepartment>,
    patches: Vec<(String, DepartmentPatch)>,
    created_users: Vec<NewUser>,
    reject_updates: bool,
    fail_creates: HashSet<String>,
    race_on_create: HashSet<String>,
    phantom_conflicts: HashSet<String>,
}

impl State {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

#[derive(Debug)]
pub struct FakeDirectory {
    state: Mutex<State>,
    page_size: usize,
}

impl Default for FakeDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
            page_size: 2,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Seed a department that already exists remotely; returns its id.
    pub fn seed_department(&self, external_id: &str, name: &str, parent_id: Option<&str>) -> String {
        let mut state = self.state();
        let id = state.allocate_id();
        state.departments.push(RemoteDepartment {
            id: id.clone(),
            external_id: external_id.to_string(),
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
            label: None,
            description: None,
        });
        id
    }

    pub fn seed_user(&self, nickname: &str) {
        let mut state = self.state();
        let id = state.allocate_id();
        state.users.push(RemoteUser {
            id,
            nickname: nickname.to_string(),
        });
    }

    /// Every adoption update fails with a 403.
    pub fn reject_updates(&self) {
        self.state().reject_updates = true;
    }

    /// Creating this external id fails with a 400.
    pub fn fail_create(&self, external_id: &str) {
        self.state().fail_creates.insert(external_id.to_string());
    }

    /// Another actor creates this department just before our create call.
    pub fn race_on_create(&self, external_id: &str) {
        self.state().race_on_create.insert(external_id.to_string());
    }

    /// Creating this external id returns a conflict, yet nothing is ever stored.
    pub fn phantom_conflict(&self, external_id: &str) {
        self.state().phantom_conflicts.insert(external_id.to_string());
    }

    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    pub fn reset_calls(&self) {
        self.state().calls = CallCounts::default();
    }

    pub fn departments(&self) -> Vec<RemoteDepartment> {
        self.state().departments.clone()
    }

    pub fn department(&self, external_id: &str) -> Option<RemoteDepartment> {
        self.state()
            .departments
            .iter()
            .find(|d| d.external_id == external_id)
            .cloned()
    }

    pub fn created_departments(&self) -> Vec<NewDepartment> {
        self.state().created_departments.clone()
    }

    pub fn patches(&self) -> Vec<(String, DepartmentPatch)> {
        self.state().patches.clone()
    }

    pub fn created_users(&self) -> Vec<NewUser> {
        self.state().created_users.clone()
    }

    pub fn user_count(&self) -> usize {
        self.state().users.len()
    }
}

#[async_trait]
impl DirectoryApi for FakeDirectory {
    async fn list_departments_page(&self, page: u32) -> Result<DepartmentPage> {
        let mut state = self.state();
        state.calls.list_pages += 1;

        let total = state.departments.len();
        let pages = total.div_ceil(self.page_size).max(1);
        let start = (page.saturating_sub(1) as usize) * self.page_size;
        let departments = state
            .departments
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();

        Ok(DepartmentPage {
            departments,
            page: Some(page),
            pages: pages as u32,
            per_page: Some(self.page_size as u32),
            total: Some(total as u64),
        })
    }

    async fn create_department(
        &self,
        department: &NewDepartment,
    ) -> Result<CreateOutcome<RemoteDepartment>> {
        let mut state = self.state();
        state.calls.create_department += 1;
        state.created_departments.push(department.clone());

        let external_id = department.external_id.clone();
        if state.fail_creates.contains(&external_id) {
            return Err(SyncError::api(400, "parent department does not exist"));
        }
        if state.phantom_conflicts.contains(&external_id) {
            return Ok(CreateOutcome::Conflict {
                detail: "department already exists".to_string(),
            });
        }
        if state.race_on_create.remove(&external_id) {
            let id = state.allocate_id();
            state.departments.push(RemoteDepartment {
                id,
                external_id: external_id.clone(),
                name: department.name.clone(),
                parent_id: department.parent_id.clone(),
                label: None,
                description: None,
            });
        }
        if state.departments.iter().any(|d| d.external_id == external_id) {
            return Ok(CreateOutcome::Conflict {
                detail: "department already exists".to_string(),
            });
        }

        let id = state.allocate_id();
        let created = RemoteDepartment {
            id,
            // The real service does not always echo the external id
            external_id: String::new(),
            name: department.name.clone(),
            parent_id: department.parent_id.clone(),
            label: department.label.clone(),
            description: department.description.clone(),
        };
        state.departments.push(RemoteDepartment {
            external_id,
            ..created.clone()
        });
        Ok(CreateOutcome::Created(created))
    }

    async fn update_department(
        &self,
        department_id: &str,
        patch: &DepartmentPatch,
    ) -> Result<RemoteDepartment> {
        let mut state = self.state();
        state.calls.update_department += 1;
        state.patches.push((department_id.to_string(), patch.clone()));

        if state.reject_updates {
            return Err(SyncError::api(403, "forbidden"));
        }

        let department = state
            .departments
            .iter_mut()
            .find(|d| d.id == department_id)
            .ok_or_else(|| SyncError::api(404, "department not found"))?;
        department.external_id = patch.external_id.clone();
        if patch.label.is_some() {
            department.label = patch.label.clone();
        }
        if patch.description.is_some() {
            department.description = patch.description.clone();
        }
        Ok(department.clone())
    }

    async fn create_user(&self, user: &NewUser) -> Result<CreateOutcome<RemoteUser>> {
        let mut state = self.state();
        state.calls.create_user += 1;
        state.created_users.push(user.clone());

        if state.users.iter().any(|u| u.nickname == user.nickname) {
            return Ok(CreateOutcome::Conflict {
                detail: "user already exists".to_string(),
            });
        }

        let created = RemoteUser {
            id: state.allocate_id(),
            nickname: user.nickname.clone(),
        };
        state.users.push(created.clone());
        Ok(CreateOutcome::Created(created))
    }
}

/// Sleeper that records requested delays instead of waiting
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}
