//! # Department Upserter
//!
//! Converges one department record onto the remote directory without ever
//! creating a duplicate on re-run. The protocol, per record:
//!
//! 1. **Existing**: the cache already holds a department with this external id.
//! 2. **Adopt**: a legacy department (no external id) has exactly this name;
//!    it is patched with the external id and the record's label/description.
//!    If the patch is rejected the record falls through to creation.
//! 3. **Create**: a new department is created under the resolved parent.
//!    A conflict means someone else created it first: the cache is refreshed
//!    and the department looked up again. Still missing after that is an
//!    inconsistency and aborts the run.
//!
//! Records are processed strictly one after another, parents first, and each
//! resolved remote id is recorded before the next record is looked at.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::client::{CreateOutcome, DirectoryApi};
use crate::constants::DepartmentOutcome;
use crate::error::{Result, SyncError};
use crate::logging::log_department_operation;
use crate::models::{DepartmentPatch, DepartmentRecord, NewDepartment, RemoteDepartment};
use crate::orchestration::department_cache::DepartmentCache;
use crate::orchestration::types::{DepartmentResult, ExternalIdMap};

/// Department convergence driven through a [`DirectoryApi`]
#[derive(Debug)]
pub struct DepartmentUpserter<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A> DepartmentUpserter<'a, A>
where
    A: DirectoryApi + ?Sized,
{
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Converge every record in `ordered` (parents first).
    ///
    /// Returns the external-id mapping for all processed records together with
    /// the per-record results, in processing order.
    pub async fn upsert_all(
        &self,
        cache: &mut DepartmentCache,
        ordered: &[&DepartmentRecord],
    ) -> Result<(ExternalIdMap, Vec<DepartmentResult>)> {
        let in_input: HashSet<&str> =
            ordered.iter().map(|r| r.external_id.as_str()).collect();

        let mut mapping = ExternalIdMap::new();
        let mut results = Vec::with_capacity(ordered.len());

        for record in ordered {
            let parent_id = resolve_parent_id(record, &in_input, &mapping, cache)?;
            let result = self.ensure_department(cache, record, parent_id).await?;
            mapping.insert(result.external_id.clone(), result.remote_id.clone());
            results.push(result);
        }

        info!(departments = results.len(), "✅ All departments converged");
        Ok((mapping, results))
    }

    /// Make sure one department exists remotely and return its remote id.
    ///
    /// `parent_id` is the already-resolved remote id of the parent, or `None`
    /// for a root.
    pub async fn ensure_department(
        &self,
        cache: &mut DepartmentCache,
        record: &DepartmentRecord,
        parent_id: Option<String>,
    ) -> Result<DepartmentResult> {
        let external_id = record.external_id.as_str();

        if let Some(existing) = cache.find_by_external_id(external_id) {
            let remote_id = existing.id.clone();
            return Ok(finish(record, remote_id, DepartmentOutcome::Existing));
        }

        let mut adoption_failed = false;
        if let Some(legacy) = cache.find_unmanaged_by_name(&record.name) {
            let legacy_id = legacy.id.clone();
            match self
                .api
                .update_department(&legacy_id, &DepartmentPatch::adopt(record))
                .await
            {
                Ok(mut updated) => {
                    updated.external_id = record.external_id.clone();
                    if updated.id.is_empty() {
                        updated.id = legacy_id;
                    }
                    let remote_id = updated.id.clone();
                    cache.replace(updated);
                    return Ok(finish(record, remote_id, DepartmentOutcome::Adopted));
                }
                Err(e) => {
                    warn!(
                        external_id = %external_id,
                        legacy_id = %legacy_id,
                        error = %e,
                        "⚠️ Adoption of legacy department failed, creating a new one instead"
                    );
                    adoption_failed = true;
                }
            }
        }

        let new_department = NewDepartment::from_record(record, parent_id);
        debug!(external_id = %external_id, parent_id = ?new_department.parent_id, "Creating department");

        match self.api.create_department(&new_department).await {
            Ok(CreateOutcome::Created(created)) => {
                let remote_id = created.id.clone();
                cache.append(stamp(created, record));
                let outcome = if adoption_failed {
                    DepartmentOutcome::CreatedAfterFailedAdoption
                } else {
                    DepartmentOutcome::Created
                };
                Ok(finish(record, remote_id, outcome))
            }
            Ok(CreateOutcome::Conflict { detail }) => {
                info!(
                    external_id = %external_id,
                    detail = %detail,
                    "Department create conflicted, refreshing cache"
                );
                cache.refresh(self.api).await?;
                match cache.find_by_external_id(external_id) {
                    Some(found) => {
                        let remote_id = found.id.clone();
                        Ok(finish(
                            record,
                            remote_id,
                            DepartmentOutcome::ResolvedAfterConflict,
                        ))
                    }
                    None => Err(SyncError::Inconsistency {
                        external_id: record.external_id.clone(),
                        detail: format!(
                            "create returned a conflict ({detail}) but no department carries this external id after refresh"
                        ),
                    }),
                }
            }
            Err(e) => Err(SyncError::DepartmentCreationFailed {
                external_id: record.external_id.clone(),
                source: Box::new(e),
            }),
        }
    }
}

/// Remote id for the record's parent.
///
/// A parent in the same input must already be mapped (it was processed
/// earlier); a parent outside the input is looked up in the cache and, when
/// absent there too, the department is created at the root with a warning.
fn resolve_parent_id(
    record: &DepartmentRecord,
    in_input: &HashSet<&str>,
    mapping: &ExternalIdMap,
    cache: &DepartmentCache,
) -> Result<Option<String>> {
    let Some(parent) = record.parent() else {
        return Ok(None);
    };

    if in_input.contains(parent) {
        return mapping
            .get(parent)
            .map(|id| Some(id.to_string()))
            .ok_or_else(|| SyncError::MissingParent {
                external_id: record.external_id.clone(),
                parent_external_id: parent.to_string(),
            });
    }

    if let Some(remote) = cache.find_by_external_id(parent) {
        return Ok(Some(remote.id.clone()));
    }

    warn!(
        external_id = %record.external_id,
        parent_external_id = %parent,
        "⚠️ Parent department not found in input or remote directory, creating without parent"
    );
    Ok(None)
}

/// The create response may not echo the external id; the cache entry must carry it.
fn stamp(mut created: RemoteDepartment, record: &DepartmentRecord) -> RemoteDepartment {
    created.external_id = record.external_id.clone();
    if created.name.is_empty() {
        created.name = record.name.clone();
    }
    created
}

fn finish(
    record: &DepartmentRecord,
    remote_id: String,
    outcome: DepartmentOutcome,
) -> DepartmentResult {
    log_department_operation(
        "ensure_department",
        &record.external_id,
        Some(&remote_id),
        outcome.as_str(),
        Some(&record.name),
    );
    DepartmentResult {
        external_id: record.external_id.clone(),
        remote_id,
        outcome,
    }
}
