//! # Resilience Module
//!
//! Fault tolerance for every call made against the directory service. Transient
//! overload and server errors are absorbed by a bounded exponential backoff;
//! everything else surfaces to the caller unchanged.
//!
//! ## Usage
//!
//! ```rust
//! use orgsync::resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::new(10, Duration::from_secs(1));
//!
//! let pages = policy
//!     .execute("list_departments", || async {
//!         // Remote call here
//!         Ok::<u32, orgsync::SyncError>(3)
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(pages, 3);
//! # });
//! ```

pub mod retry;

pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
