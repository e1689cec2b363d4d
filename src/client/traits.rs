//! # Directory API Trait
//!
//! The seam between the sync engine and the remote directory service. The
//! HTTP implementation lives in [`crate::client::DirectoryClient`]; tests plug
//! in-memory stores in here.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    DepartmentPage, DepartmentPatch, NewDepartment, NewUser, RemoteDepartment, RemoteUser,
};

/// Result of a create call
///
/// A conflict (HTTP 409) is an expected branch, not an error: the resource
/// already exists on the remote side and the caller decides what to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome<T> {
    Created(T),
    Conflict { detail: String },
}

impl<T> CreateOutcome<T> {
    pub fn is_conflict(&self) -> bool {
        matches!(self, CreateOutcome::Conflict { .. })
    }
}

/// Typed operations against the directory service
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// Fetch one page (1-based) of the department listing.
    async fn list_departments_page(&self, page: u32) -> Result<DepartmentPage>;

    async fn create_department(
        &self,
        department: &NewDepartment,
    ) -> Result<CreateOutcome<RemoteDepartment>>;

    /// Patch management metadata (external id, label, description) only.
    async fn update_department(
        &self,
        department_id: &str,
        patch: &DepartmentPatch,
    ) -> Result<RemoteDepartment>;

    async fn create_user(&self, user: &NewUser) -> Result<CreateOutcome<RemoteUser>>;

    /// Drive [`DirectoryApi::list_departments_page`] until every page is consumed.
    ///
    /// Any page that fails (including after exhausting retries) fails the
    /// whole listing; a partial listing is never returned.
    async fn list_all_departments(&self) -> Result<Vec<RemoteDepartment>> {
        let mut departments = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.list_departments_page(page).await?;
            debug!(
                page = page,
                pages = batch.pages,
                count = batch.departments.len(),
                "Fetched department page"
            );
            departments.extend(batch.departments);
            if page >= batch.pages {
                break;
            }
            page += 1;
        }
        Ok(departments)
    }
}
