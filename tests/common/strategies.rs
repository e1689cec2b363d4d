//! proptest strategies for department forests

#![allow(dead_code)]

use proptest::prelude::*;

use orgsync::models::DepartmentRecord;

/// A random forest of departments, shuffled so children often precede parents
///
/// Node `i` may only point at a node `j < i`, which keeps the generated
/// hierarchy acyclic before shuffling.
pub fn department_forest_strategy() -> impl Strategy<Value = Vec<DepartmentRecord>> {
    (1usize..40)
        .prop_flat_map(|size| {
            prop::collection::vec((any::<bool>(), any::<prop::sample::Index>()), size)
        })
        .prop_map(|links| {
            links
                .iter()
                .enumerate()
                .map(|(i, (has_parent, index))| {
                    let record = DepartmentRecord::new(format!("d{i}"), format!("Department {i}"));
                    if i > 0 && *has_parent {
                        record.with_parent(format!("d{}", index.index(i)))
                    } else {
                        record
                    }
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

/// A chain whose head points back at its tail, so every member is on the cycle
pub fn cyclic_chain_strategy() -> impl Strategy<Value = Vec<DepartmentRecord>> {
    (2usize..12)
        .prop_map(|len| {
            (0..len)
                .map(|i| {
                    let parent = if i == 0 { len - 1 } else { i - 1 };
                    DepartmentRecord::new(format!("c{i}"), format!("Cycle {i}"))
                        .with_parent(format!("c{parent}"))
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}
