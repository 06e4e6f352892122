//! Enrollment store for the flex registration service.
//!
//! This crate owns all flex period state and provides the one atomic
//! primitive the registration transaction is built on:
//!
//! - [`StorageBackend`] abstracts durability (file-based for production,
//!   in-memory for tests and ephemeral mode)
//! - [`EnrollmentStore`] keeps the authoritative aggregates in memory,
//!   writes through to the backend, and serializes commits per aggregate
//!   via version compare-and-install with a bounded internal retry
//!
//! Commits against one period are linearizable: every successful
//! [`EnrollmentStore::commit_enrollment`] ran its admission check against
//! the state left by the previously committed transaction on that period.
//! Commits against different periods never invalidate each other.

#![deny(unsafe_code)]

mod backend;
mod store;

pub use backend::{FileBackend, InMemoryBackend, StorageBackend};
pub use store::{EnrollmentStore, MAX_COMMIT_RETRIES};
