//! Core type definitions for the flex registration service.
//!
//! This crate is the shared vocabulary of the workspace:
//!
//! - Identifier newtypes (`PeriodId`, `OptionId`, `StudentId`)
//! - The `FlexPeriod` aggregate, its options, and the registration transition
//! - The unified error taxonomy with machine-readable codes
//! - Postcard encode/decode helpers used for aggregate persistence

#![deny(unsafe_code)]

pub mod codec;
pub mod error;
mod ids;
mod types;

pub use codec::{decode, encode, CodecError};
pub use error::{ErrorCode, RegistryError, Result};
pub use ids::{OptionId, PeriodId, StudentId};
pub use types::{FlexOption, FlexPeriod, PeriodStatus, Registration, RegistrationStatus};
