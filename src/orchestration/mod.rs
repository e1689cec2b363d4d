//! # Orchestration Engine
//!
//! The sync pipeline that turns department and user records into remote
//! directory state.
//!
//! ## Core Components
//!
//! - **resolve_creation_order**: parents-first ordering with cycle detection
//! - **DepartmentCache**: local snapshot of remote departments
//! - **DepartmentUpserter**: find / adopt / create protocol for one department
//! - **UserProvisioner**: paced user creation with conflict-as-exists handling
//! - **SyncCoordinator**: runs the phases in order and builds the report
//!
//! All remote work happens on a single logical thread of control; nothing in
//! this module spawns tasks or issues calls concurrently.

pub mod department_cache;
pub mod department_upserter;
pub mod hierarchy_resolver;
pub mod sync_coordinator;
pub mod types;
pub mod user_provisioner;

pub use department_cache::DepartmentCache;
pub use department_upserter::DepartmentUpserter;
pub use hierarchy_resolver::resolve_creation_order;
pub use sync_coordinator::{plan_dry_run, SyncCoordinator};
pub use types::{
    DepartmentResult, DryRunPlan, ExternalIdMap, PlannedDepartment, PlannedUser, SyncReport,
    SyncSummary, UserResult,
};
pub use user_provisioner::UserProvisioner;
