#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # orgsync
//!
//! Idempotent synchronization of an organizational hierarchy (departments and
//! users) from flat CSV input into a paginated, rate-limited directory API.
//!
//! ## Overview
//!
//! Three problems make this harder than a loop of API calls:
//!
//! - department rows arrive in arbitrary order, but a child can only be
//!   created under a parent that already exists remotely;
//! - every mutation must be safe to repeat after a partial failure, including
//!   when another run creates the same department concurrently;
//! - the backend throttles and fails intermittently, and none of that may
//!   corrupt state or double-create anything.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Hierarchy resolution, department upsert, user provisioning
//! - [`client`] - Typed directory API trait and its HTTP implementation
//! - [`resilience`] - Exponential backoff for transient failures
//! - [`models`] - Input records and wire types
//! - [`input`] / [`validation`] - CSV loading and record checks
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Console and JSON file logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orgsync::client::DirectoryClient;
//! use orgsync::config::SyncConfig;
//! use orgsync::orchestration::SyncCoordinator;
//! use std::path::Path;
//!
//! # async fn example() -> orgsync::Result<()> {
//! let config = SyncConfig::load(None)?;
//! config.validate()?;
//!
//! let departments = orgsync::input::load_departments(&config.departments_csv)?;
//! let users = orgsync::input::load_users(Path::new("users.csv"))?;
//!
//! let client = DirectoryClient::new(&config)?;
//! let report = SyncCoordinator::from_config(client, &config)
//!     .run(&departments, &users)
//!     .await?;
//!
//! println!("created {} users", report.summary.users_created);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, workflow and HTTP tests
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod resilience;
pub mod utils;
pub mod validation;

pub use client::{CreateOutcome, DirectoryApi, DirectoryClient};
pub use config::{RetryConfig, SyncConfig};
pub use constants::{DepartmentOutcome, UserStatus};
pub use error::{Result, SyncError};
pub use orchestration::{plan_dry_run, DryRunPlan, SyncCoordinator, SyncReport};
pub use resilience::RetryPolicy;
