//! # System Constants
//!
//! Wire-level constants of the directory API, payload defaults, and the
//! outcome enums reported for every synchronized department and user.

use serde::{Deserialize, Serialize};

/// Directory API defaults
pub mod api {
    pub const DEFAULT_API_BASE: &str = "https://api360.yandex.net/directory/v1";
    pub const DEFAULT_PAGE_SIZE: u32 = 100;
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
    pub const AUTH_SCHEME: &str = "OAuth";

    /// HTTP statuses that signal overload or a momentary server failure.
    pub const TRANSIENT_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

    /// Status used by the service for "resource already exists".
    pub const CONFLICT_STATUS: u16 = 409;
}

/// Retry and pacing defaults
pub mod pacing {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
    pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
    pub const DEFAULT_USER_PAUSE_MS: u64 = 500;
}

/// Defaults applied to optional user fields when building a create request
pub mod user_defaults {
    pub const LANGUAGE: &str = "ru";
    pub const TIMEZONE: &str = "Europe/Moscow";
    pub const PASSWORD_CHANGE_REQUIRED: bool = true;
}

/// Transient/fatal classification over an HTTP status code.
#[must_use]
pub fn is_transient_status(status: u16) -> bool {
    api::TRANSIENT_STATUS_CODES.contains(&status)
}

/// How a department reached its converged state during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentOutcome {
    /// Already present under its external id; no mutation issued.
    Existing,
    /// Legacy department matched by name and stamped with the external id.
    Adopted,
    Created,
    /// Adoption update was rejected and a new department was created instead.
    /// The remote side may now hold two departments with the same name.
    CreatedAfterFailedAdoption,
    /// Create returned a conflict and a refresh found the department.
    ResolvedAfterConflict,
}

impl DepartmentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepartmentOutcome::Existing => "existing",
            DepartmentOutcome::Adopted => "adopted",
            DepartmentOutcome::Created => "created",
            DepartmentOutcome::CreatedAfterFailedAdoption => "created_after_failed_adoption",
            DepartmentOutcome::ResolvedAfterConflict => "resolved_after_conflict",
        }
    }

    /// Whether the outcome changed remote state through a call of this run.
    #[must_use]
    pub fn mutated_remote(&self) -> bool {
        !matches!(
            self,
            DepartmentOutcome::Existing | DepartmentOutcome::ResolvedAfterConflict
        )
    }
}

/// Result status of a user creation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Created,
    Exists,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Created => "created",
            UserStatus::Exists => "exists",
        }
    }
}
