//! The enrollment store: authoritative aggregates with atomic commits.
//!
//! State layout: a map of per-period slots, each slot an independently
//! locked [`FlexPeriod`] aggregate written through to a [`StorageBackend`]
//! on every commit. The map lock only guards topology (lookup, seeding);
//! commits contend solely on their own period's slot, so registrations
//! against different periods proceed fully in parallel.
//!
//! The commit protocol per slot is optimistic: validate on a private
//! snapshot, then install it only if the live aggregate's version is still
//! the snapshot's version. A lost race re-runs the whole
//! read-validate-write cycle; the retry is bounded and internal, so callers
//! only ever see a committed result or a business-level rejection — never a
//! raw version conflict.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, warn};

use flexreg_types::{
    FlexPeriod, OptionId, PeriodId, Registration, RegistrationStatus, RegistryError, Result,
    StudentId,
};

use crate::backend::StorageBackend;

/// Upper bound on read-validate-write attempts per commit.
///
/// A conflict means another commit landed on the same period between our
/// snapshot and our install; under realistic registration traffic a handful
/// of retries is plenty, and exhausting them surfaces as `Contention`.
pub const MAX_COMMIT_RETRIES: u32 = 8;

/// One independently locked aggregate.
type PeriodSlot = Arc<RwLock<FlexPeriod>>;

/// Durable, consistent storage of flex period aggregates with atomic
/// read-modify-write access to a single aggregate per operation.
///
/// Generic over [`StorageBackend`] to support both file-based (production)
/// and in-memory (testing/ephemeral) durability.
pub struct EnrollmentStore<B: StorageBackend> {
    /// Durability backend; written through before a commit is installed.
    backend: B,
    /// Aggregate slots by period id. The outer lock guards the map shape
    /// only; aggregate state is guarded per slot.
    periods: RwLock<HashMap<PeriodId, PeriodSlot>>,
}

impl<B: StorageBackend> EnrollmentStore<B> {
    /// Opens the store, recovering all persisted aggregates from the backend.
    ///
    /// # Errors
    ///
    /// Returns `Storage`/`Io`/`Codec` if recovery fails.
    pub fn open(backend: B) -> Result<Self> {
        let periods = backend
            .load_all()?
            .into_iter()
            .map(|p| (p.id, Arc::new(RwLock::new(p))))
            .collect::<HashMap<_, _>>();
        Ok(Self { backend, periods: RwLock::new(periods) })
    }

    /// Whether the store holds no aggregates (drives seed-on-startup).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.read().is_empty()
    }

    /// Returns the slot for a period, if one exists.
    fn slot(&self, period_id: PeriodId) -> Option<PeriodSlot> {
        self.periods.read().get(&period_id).cloned()
    }

    /// Returns a snapshot of one aggregate. No side effects.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if no aggregate exists for the id.
    pub fn get_period(&self, period_id: PeriodId) -> Result<FlexPeriod> {
        self.slot(period_id)
            .map(|slot| slot.read().clone())
            .ok_or(RegistryError::PeriodNotFound { period_id })
    }

    /// Returns snapshots of all aggregates in stable id order.
    #[must_use]
    pub fn list_periods(&self) -> Vec<FlexPeriod> {
        let slots: Vec<PeriodSlot> = self.periods.read().values().cloned().collect();
        let mut periods: Vec<_> = slots.iter().map(|slot| slot.read().clone()).collect();
        periods.sort_by_key(|p| p.id);
        periods
    }

    /// Inserts an aggregate, replacing the state of any existing one with
    /// the same id.
    ///
    /// This is the seeding/bootstrap path, not part of the registration
    /// transaction; it persists through the backend before the aggregate
    /// becomes visible.
    ///
    /// # Errors
    ///
    /// Returns `Io`/`Codec` if persistence fails.
    pub fn insert_period(&self, period: FlexPeriod) -> Result<()> {
        self.backend.persist(&period)?;
        let mut map = self.periods.write();
        match map.get(&period.id) {
            // Write through the existing slot so in-flight commits keep
            // racing against live state rather than a detached aggregate.
            Some(slot) => *slot.write() = period,
            None => {
                map.insert(period.id, Arc::new(RwLock::new(period)));
            }
        }
        Ok(())
    }

    /// Atomically registers a student into an option of a period.
    ///
    /// Executes the registration transaction as one atomic unit against the
    /// targeted aggregate: snapshot, validate, mutate a private copy, and
    /// install it under the slot's write lock only if no other commit
    /// landed on the period in between. On any failure nothing is mutated —
    /// the scratch copy is discarded and the live slot and backend are
    /// untouched.
    ///
    /// Idempotent re-registration (`RegistrationStatus::Unchanged`) commits
    /// nothing: no version bump, no persistence, success returned.
    ///
    /// Version conflicts with concurrent commits are absorbed by an internal
    /// bounded retry of the whole cycle; each retry re-reads current state,
    /// so its admission check reflects every previously committed
    /// registration on this period. Commits are thereby linearizable per
    /// period, and commits on different periods share no lock.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound`, `PeriodNotAvailable`, `OptionNotFound`, or
    /// `OptionFull` when the transaction is rejected; `Contention` when the
    /// retry budget is exhausted; `Io`/`Codec` when persistence fails.
    pub fn commit_enrollment(
        &self,
        period_id: PeriodId,
        option_id: OptionId,
        student_id: StudentId,
    ) -> Result<Registration> {
        let slot = self
            .slot(period_id)
            .ok_or(RegistryError::PeriodNotFound { period_id })?;

        for attempt in 0..MAX_COMMIT_RETRIES {
            let mut scratch = slot.read().clone();
            let snapshot_version = scratch.version;

            let status = scratch.apply_registration(option_id, student_id)?;
            if status == RegistrationStatus::Unchanged {
                return Ok(Registration { period_id, option_id, student_id, status });
            }

            scratch.version += 1;
            scratch.updated_at = Utc::now();

            let mut live = slot.write();
            if live.version == snapshot_version {
                // Persist before install: a backend failure aborts the
                // commit with the live aggregate untouched.
                self.backend.persist(&scratch)?;
                *live = scratch;
                return Ok(Registration { period_id, option_id, student_id, status });
            }
            drop(live);
            debug!(
                period = %period_id,
                option = %option_id,
                student = %student_id,
                attempt,
                "commit lost version race, retrying"
            );
        }

        warn!(
            period = %period_id,
            student = %student_id,
            attempts = MAX_COMMIT_RETRIES,
            "commit retry budget exhausted"
        );
        Err(RegistryError::Contention { period_id, attempts: MAX_COMMIT_RETRIES })
    }
}
