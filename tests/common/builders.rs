//! Record fixtures shared by the workflow tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use orgsync::models::{DepartmentRecord, UserRecord};
use orgsync::orchestration::SyncCoordinator;

use super::fake_directory::{FakeDirectory, RecordingSleeper};

/// Head office with two divisions and a team, listed children first
pub fn sample_departments() -> Vec<DepartmentRecord> {
    vec![
        DepartmentRecord::new("team-a", "Platform Team").with_parent("eng"),
        DepartmentRecord::new("eng", "Engineering").with_parent("hq"),
        DepartmentRecord::new("sales", "Sales")
            .with_parent("hq")
            .with_label("sales"),
        DepartmentRecord::new("hq", "Head Office"),
    ]
}

pub fn sample_users() -> Vec<UserRecord> {
    vec![
        UserRecord::new("ivan.petrov", "Ivan", "Petrov", "team-a"),
        UserRecord::new("olga.ivanova", "Olga", "Ivanova", "sales"),
        UserRecord::new("anna.smirnova", "Anna", "Smirnova", "hq"),
    ]
}

/// Coordinator over `directory` that records user pauses instead of sleeping
pub fn coordinator(
    directory: FakeDirectory,
) -> (SyncCoordinator<FakeDirectory>, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let coordinator = SyncCoordinator::new(directory)
        .with_user_pause(Duration::from_millis(500))
        .with_sleeper(sleeper.clone());
    (coordinator, sleeper)
}
