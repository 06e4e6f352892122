//! Flex registration server library.
//!
//! Provides the registration service, the HTTP boundary, configuration,
//! seeding, and shutdown handling. The binary in `main.rs` wires these
//! together; integration tests drive the router directly.

#![deny(unsafe_code)]

pub mod config;
pub mod routes;
pub mod seed;
pub mod service;
pub mod shutdown;
