//! Shared test utilities for flexreg crates.
//!
//! This crate provides common test helpers to reduce boilerplate across test
//! modules:
//!
//! - [`TestDir`] - Managed temporary directory with path helpers
//! - [`fixtures`] - Flex period/option builders shaped like real seed data

#![deny(unsafe_code)]

mod test_dir;
pub use test_dir::TestDir;

pub mod fixtures;
