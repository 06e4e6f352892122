//! In-memory storage backend for tests and ephemeral mode.

use std::collections::HashMap;

use parking_lot::RwLock;
use snafu::ResultExt;

use flexreg_types::error::CodecSnafu;
use flexreg_types::{decode, encode, FlexPeriod, PeriodId, Result};

use super::StorageBackend;

/// In-memory storage backend.
///
/// Aggregates are held as encoded bytes so the backend exercises the same
/// codec path as [`super::FileBackend`]; everything is lost when the backend
/// is dropped. Used by tests and by the server's ephemeral mode (no data
/// directory configured).
#[derive(Default)]
pub struct InMemoryBackend {
    /// Encoded aggregates indexed by period id.
    periods: RwLock<HashMap<PeriodId, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted aggregates.
    #[must_use]
    pub fn period_count(&self) -> usize {
        self.periods.read().len()
    }
}

impl StorageBackend for InMemoryBackend {
    fn load_all(&self) -> Result<Vec<FlexPeriod>> {
        self.periods
            .read()
            .values()
            .map(|bytes| decode(bytes).context(CodecSnafu))
            .collect()
    }

    fn persist(&self, period: &FlexPeriod) -> Result<()> {
        let bytes = encode(period).context(CodecSnafu)?;
        self.periods.write().insert(period.id, bytes);
        Ok(())
    }
}
