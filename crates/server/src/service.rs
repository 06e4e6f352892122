//! The registration service: the transaction consumed by the presentation
//! layer, plus the read paths used purely for display.
//!
//! The service holds no state of its own — it mediates between the HTTP
//! boundary and the enrollment store. The authenticated student identity is
//! an explicit parameter on every mutating call; it is never derived from
//! ambient request state at this layer.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use flexreg_store::{EnrollmentStore, StorageBackend};
use flexreg_types::{
    FlexPeriod, OptionId, PeriodId, PeriodStatus, Registration, Result, StudentId,
};

/// One row of the period list view.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    /// Period identifier, used to fetch the detail view.
    pub id: PeriodId,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: PeriodStatus,
}

/// One option row of the period detail view.
///
/// Exposes the occupied-seat count rather than enrollee identities; the
/// display needs "how many seats are left", not who holds them.
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    /// Option identifier within the period.
    pub id: OptionId,
    /// Activity title.
    pub title: String,
    /// Room or location.
    pub room: String,
    /// Supervising teacher.
    pub teacher: String,
    /// Seat capacity.
    pub capacity: u32,
    /// Occupied seats.
    pub enrolled: usize,
}

/// The period detail view.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodDetail {
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: PeriodStatus,
    /// Options in stable display order.
    pub options: Vec<OptionView>,
}

impl From<&FlexPeriod> for PeriodDetail {
    fn from(period: &FlexPeriod) -> Self {
        Self {
            name: period.name.clone(),
            status: period.status,
            options: period
                .options
                .iter()
                .map(|o| OptionView {
                    id: o.id,
                    title: o.title.clone(),
                    room: o.room.clone(),
                    teacher: o.teacher.clone(),
                    capacity: o.capacity,
                    enrolled: o.seats_taken(),
                })
                .collect(),
        }
    }
}

/// Stateless mediator between the HTTP boundary and the enrollment store.
pub struct RegistrationService<B: StorageBackend> {
    store: Arc<EnrollmentStore<B>>,
}

impl<B: StorageBackend> Clone for RegistrationService<B> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<B: StorageBackend> RegistrationService<B> {
    /// Creates a service over a shared store handle.
    pub fn new(store: Arc<EnrollmentStore<B>>) -> Self {
        Self { store }
    }

    /// Registers the authenticated student into an option of a period.
    ///
    /// Delegates to the store's atomic commit; business rejections and the
    /// (already retried) transient contention outcome propagate unchanged to
    /// the caller. Nothing is retried here.
    ///
    /// # Errors
    ///
    /// Returns the store's typed rejections: `PeriodNotFound`,
    /// `PeriodNotAvailable`, `OptionNotFound`, `OptionFull`, `Contention`,
    /// or a persistence failure.
    pub fn register(
        &self,
        student_id: StudentId,
        period_id: PeriodId,
        option_id: OptionId,
    ) -> Result<Registration> {
        match self.store.commit_enrollment(period_id, option_id, student_id) {
            Ok(registration) => {
                info!(
                    student = %student_id,
                    period = %period_id,
                    option = %option_id,
                    status = ?registration.status,
                    "registration committed"
                );
                Ok(registration)
            }
            Err(err) if err.is_retryable() => {
                warn!(
                    student = %student_id,
                    period = %period_id,
                    option = %option_id,
                    error = %err,
                    "registration failed transiently"
                );
                Err(err)
            }
            Err(err) => {
                info!(
                    student = %student_id,
                    period = %period_id,
                    option = %option_id,
                    error = %err,
                    "registration rejected"
                );
                Err(err)
            }
        }
    }

    /// Returns the period list view. No side effects.
    #[must_use]
    pub fn period_summaries(&self) -> Vec<PeriodSummary> {
        self.store
            .list_periods()
            .into_iter()
            .map(|p| PeriodSummary { id: p.id, name: p.name, status: p.status })
            .collect()
    }

    /// Returns the detail view of one period. No side effects.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if no period exists with the id.
    pub fn period_detail(&self, period_id: PeriodId) -> Result<PeriodDetail> {
        let period = self.store.get_period(period_id)?;
        Ok(PeriodDetail::from(&period))
    }
}
