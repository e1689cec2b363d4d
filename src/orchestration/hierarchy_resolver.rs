//! # Hierarchy Resolver
//!
//! Orders department records so that every parent precedes its children.
//!
//! Only parent links that point at another record in the same input create an
//! ordering constraint. A parent outside the input is expected to exist
//! remotely already and is resolved later against the cache.
//!
//! The ordering is Kahn's algorithm seeded in input order, so the result is
//! deterministic for a given input. Any record left unordered means the parent
//! links contain a cycle, and the whole run is rejected before a single remote
//! call is issued.

use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::models::DepartmentRecord;

/// Return `records` in creation order (parents first).
///
/// # Errors
///
/// [`SyncError::CycleDetected`] naming the external ids that sit on a cycle.
pub fn resolve_creation_order(records: &[DepartmentRecord]) -> Result<Vec<&DepartmentRecord>> {
    let index: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (record.external_id.as_str(), i))
        .collect();

    let parents: Vec<Option<usize>> = records
        .iter()
        .map(|record| record.parent().and_then(|parent| index.get(parent).copied()))
        .collect();

    let mut in_degree = vec![0usize; records.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    for (child, parent) in parents.iter().enumerate() {
        if let Some(parent) = parent {
            in_degree[child] += 1;
            children[*parent].push(child);
        }
    }

    let mut ready: VecDeque<usize> = (0..records.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(records.len());

    while let Some(current) = ready.pop_front() {
        order.push(current);
        for &child in &children[current] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.push_back(child);
            }
        }
    }

    if order.len() < records.len() {
        let members = cycle_members(records, &parents, &in_degree);
        debug!(members = ?members, "Department hierarchy contains a cycle");
        return Err(SyncError::CycleDetected { members });
    }

    Ok(order.into_iter().map(|i| &records[i]).collect())
}

/// External ids of the unordered records that lie on a cycle.
///
/// Each record has at most one parent, so following parent links from a
/// record on a cycle returns to it. Records merely hanging below a cycle are
/// left out.
fn cycle_members(
    records: &[DepartmentRecord],
    parents: &[Option<usize>],
    in_degree: &[usize],
) -> Vec<String> {
    let unordered: Vec<usize> = (0..records.len()).filter(|&i| in_degree[i] > 0).collect();
    let limit = unordered.len();

    let on_cycle = |start: usize| {
        let mut current = parents[start];
        for _ in 0..limit {
            match current {
                Some(node) if node == start => return true,
                Some(node) => current = parents[node],
                None => return false,
            }
        }
        false
    };

    let mut members: Vec<String> = unordered
        .into_iter()
        .filter(|&i| on_cycle(i))
        .map(|i| records[i].external_id.clone())
        .collect();
    members.sort();
    members
}
