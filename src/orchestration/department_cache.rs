//! # Department Cache
//!
//! In-process snapshot of the remote department list. The snapshot is only
//! ever replaced wholesale by [`DepartmentCache::refresh`]; between refreshes
//! it is patched locally with the departments this run creates or adopts.
//! Rows created by other actors are invisible until the next refresh.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::client::DirectoryApi;
use crate::error::Result;
use crate::models::RemoteDepartment;

#[derive(Debug, Clone, Default)]
pub struct DepartmentCache {
    departments: Vec<RemoteDepartment>,
    refreshed_at: Option<DateTime<Utc>>,
    refresh_count: u32,
}

impl DepartmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the cache with a known snapshot (no remote call).
    pub fn from_snapshot(departments: Vec<RemoteDepartment>) -> Self {
        Self {
            departments,
            refreshed_at: Some(Utc::now()),
            refresh_count: 0,
        }
    }

    /// Replace the snapshot with the full remote listing.
    ///
    /// On failure the previous snapshot is left untouched.
    pub async fn refresh<A>(&mut self, api: &A) -> Result<usize>
    where
        A: DirectoryApi + ?Sized,
    {
        let departments = api.list_all_departments().await?;
        self.departments = departments;
        self.refreshed_at = Some(Utc::now());
        self.refresh_count += 1;

        info!(
            departments = self.departments.len(),
            refresh = self.refresh_count,
            "🗂️ Department cache refreshed"
        );
        Ok(self.departments.len())
    }

    pub fn find_by_external_id(&self, external_id: &str) -> Option<&RemoteDepartment> {
        if external_id.is_empty() {
            return None;
        }
        self.departments
            .iter()
            .find(|d| d.external_id == external_id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RemoteDepartment> {
        self.departments.iter().find(|d| d.name == name)
    }

    /// Exact name match among departments that carry no external id yet.
    pub fn find_unmanaged_by_name(&self, name: &str) -> Option<&RemoteDepartment> {
        self.departments
            .iter()
            .find(|d| !d.is_managed() && d.name == name)
    }

    pub fn append(&mut self, department: RemoteDepartment) {
        self.departments.push(department);
    }

    /// Overwrite the entry with the same remote id; appends when absent.
    pub fn replace(&mut self, department: RemoteDepartment) {
        match self.departments.iter_mut().find(|d| d.id == department.id) {
            Some(entry) => *entry = department,
            None => self.departments.push(department),
        }
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteDepartment> {
        self.departments.iter()
    }

    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}
