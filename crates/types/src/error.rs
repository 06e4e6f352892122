//! Error types for the flex registration service using snafu.
//!
//! One unified error enum covers the storage layer, the registration
//! transaction, and the service boundary. Each variant maps to an
//! [`ErrorCode`] with a unique numeric identifier and a retryability
//! classification; the numeric code is what the HTTP layer puts in error
//! response bodies so clients can distinguish failure kinds without parsing
//! messages.

use core::fmt;

use snafu::{Location, Snafu};

use crate::codec::CodecError;
use crate::ids::{OptionId, PeriodId};
use crate::types::PeriodStatus;

/// Unified result type for registry operations.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

/// Machine-readable error codes for programmatic error handling.
///
/// Codes are organized into ranges:
///
/// | Range     | Domain       | Examples                               |
/// |-----------|--------------|----------------------------------------|
/// | 1000–1099 | Storage      | backend persistence, codec             |
/// | 2000–2099 | Registration | not-found, availability, capacity      |
/// | 2100–2199 | Boundary     | identifier validation                  |
/// | 3000–3199 | Transient    | commit contention, configuration, I/O  |
///
/// Codes are transmitted as the numeric value in the `code` field of JSON
/// error bodies. Use [`ErrorCode::as_u16`] for serialization and
/// [`ErrorCode::from_u16`] for deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // --- Storage errors (1000–1099) ---
    /// Backend persistence operation failed.
    Storage = 1000,
    /// Aggregate serialization or deserialization failed.
    Codec = 1001,

    // --- Registration errors (2000–2099) ---
    /// No flex period exists with the requested id.
    PeriodNotFound = 2000,
    /// The period exists but has no option with the requested id.
    OptionNotFound = 2001,
    /// The period is not open for registration (upcoming or closed).
    PeriodNotAvailable = 2002,
    /// The target option has no free seat.
    OptionFull = 2003,

    // --- Boundary errors (2100–2199) ---
    /// A supplied identifier failed validated parsing.
    InvalidIdentifier = 2100,

    // --- Transient / operational errors (3000–3199) ---
    /// The optimistic commit lost to concurrent writers until the retry
    /// budget was exhausted.
    Contention = 3000,
    /// Configuration error.
    Config = 3100,
    /// Filesystem I/O error.
    Io = 3101,
}

impl ErrorCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a numeric code to an `ErrorCode`, returning `None` for unknown values.
    #[must_use]
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1000 => Some(Self::Storage),
            1001 => Some(Self::Codec),
            2000 => Some(Self::PeriodNotFound),
            2001 => Some(Self::OptionNotFound),
            2002 => Some(Self::PeriodNotAvailable),
            2003 => Some(Self::OptionFull),
            2100 => Some(Self::InvalidIdentifier),
            3000 => Some(Self::Contention),
            3100 => Some(Self::Config),
            3101 => Some(Self::Io),
            _ => None,
        }
    }

    /// Whether this error is retryable.
    ///
    /// Retryable errors may succeed on a subsequent attempt. `OptionFull` is
    /// deliberately not retryable: a seat only frees up if another student
    /// transfers out, which a blind retry cannot anticipate.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Storage | Self::Contention | Self::Io)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Top-level error type for registry operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RegistryError {
    /// Backend persistence failure (disk I/O, unwritable data directory).
    #[snafu(display("Storage error at {location}: {message}"))]
    Storage {
        /// Error description.
        message: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// Aggregate encoding or decoding failed.
    #[snafu(display("Codec error at {location}: {source}"))]
    Codec {
        /// The underlying codec error.
        source: CodecError,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// No flex period exists with the requested id.
    #[snafu(display("Flex period {period_id} not found"))]
    PeriodNotFound {
        /// Requested period.
        period_id: PeriodId,
    },

    /// The period exists but contains no option with the requested id.
    #[snafu(display("Flex option {option_id} not found in {period_id}"))]
    OptionNotFound {
        /// Parent period.
        period_id: PeriodId,
        /// Requested option.
        option_id: OptionId,
    },

    /// The period is not open for registration. Covers both `upcoming` and
    /// `closed`; the offending status is reported.
    #[snafu(display("Flex period {period_id} is not available for registration (status: {status})"))]
    PeriodNotAvailable {
        /// Requested period.
        period_id: PeriodId,
        /// Its current status.
        status: PeriodStatus,
    },

    /// The admission check failed: every seat in the target option is taken.
    #[snafu(display("Flex option {option_id} is full ({capacity} seats)"))]
    OptionFull {
        /// Target option.
        option_id: OptionId,
        /// Its seat capacity.
        capacity: u32,
    },

    /// A supplied identifier failed validated parsing at the boundary.
    #[snafu(display("Invalid {field}: {value:?}"))]
    InvalidIdentifier {
        /// Name of the offending field (e.g. `flexId`).
        field: String,
        /// The rejected raw value.
        value: String,
    },

    /// The optimistic commit kept losing to concurrent writers and the
    /// bounded retry budget ran out. Transient; distinct from every
    /// business-level failure above.
    #[snafu(display("Commit contention on {period_id} after {attempts} attempts"))]
    Contention {
        /// Contended period.
        period_id: PeriodId,
        /// Number of read-validate-write attempts made.
        attempts: u32,
    },

    /// Configuration error (invalid value or constraint violation).
    #[snafu(display("Configuration error: {message}"))]
    Config {
        /// Error description.
        message: String,
    },

    /// Filesystem I/O error.
    #[snafu(display("I/O error at {location}: {source}"))]
    Io {
        /// Underlying I/O error.
        source: std::io::Error,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}

impl RegistryError {
    /// Returns the machine-readable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Storage { .. } => ErrorCode::Storage,
            Self::Codec { .. } => ErrorCode::Codec,
            Self::PeriodNotFound { .. } => ErrorCode::PeriodNotFound,
            Self::OptionNotFound { .. } => ErrorCode::OptionNotFound,
            Self::PeriodNotAvailable { .. } => ErrorCode::PeriodNotAvailable,
            Self::OptionFull { .. } => ErrorCode::OptionFull,
            Self::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            Self::Contention { .. } => ErrorCode::Contention,
            Self::Config { .. } => ErrorCode::Config,
            Self::Io { .. } => ErrorCode::Io,
        }
    }

    /// Whether this error is retryable. Delegates to
    /// [`ErrorCode::is_retryable`] for consistency with the wire format.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}
