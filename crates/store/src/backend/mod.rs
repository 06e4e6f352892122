//! Storage backend abstraction for the enrollment store.
//!
//! The backend trait abstracts the durability mechanism, allowing both
//! file-based (production) and in-memory (testing/ephemeral) implementations.
//! Backends address whole aggregates: one flex period, with all its options
//! and enrollee sets, is persisted and recovered as a single unit, which is
//! what makes the store's per-aggregate commit atomic with respect to
//! durability.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::InMemoryBackend;

use flexreg_types::{FlexPeriod, Result};

/// Durability backend for flex period aggregates.
pub trait StorageBackend: Send + Sync {
    /// Loads every persisted aggregate, in no particular order.
    ///
    /// Called once when the store opens; the store owns the state from then
    /// on and only writes through.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the underlying storage cannot be read, or `Codec` if
    /// a persisted aggregate fails to decode.
    fn load_all(&self) -> Result<Vec<FlexPeriod>>;

    /// Durably persists one aggregate, replacing any previous state for the
    /// same period id.
    ///
    /// Must be atomic per aggregate: a crash mid-persist leaves either the
    /// previous state or the new state recoverable, never a torn record.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the write fails, or `Codec` if the aggregate fails to
    /// encode.
    fn persist(&self, period: &FlexPeriod) -> Result<()>;
}
