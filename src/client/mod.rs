//! # Directory Client
//!
//! Typed access to the remote directory service: paginated department
//! listing, department create/update and user creation.

pub mod directory_client;
pub mod traits;

pub use directory_client::DirectoryClient;
pub use traits::{CreateOutcome, DirectoryApi};
