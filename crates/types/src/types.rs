//! Domain model for flex periods and their options.
//!
//! A [`FlexPeriod`] is the aggregate: one addressable record embedding its
//! options and each option's enrolled-student set, with a version counter
//! used for optimistic concurrency control. All registration state lives
//! here; there is no separate registration table.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::ids::{OptionId, PeriodId, StudentId};

/// Lifecycle status of a flex period.
///
/// Only `Available` accepts registrations. `Upcoming` periods are listed but
/// not yet enrollable; `Closed` periods accept no new registrations
/// regardless of option state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Announced but not yet open for registration.
    Upcoming,
    /// Open for registration.
    Available,
    /// Registration window has ended.
    Closed,
}

impl PeriodStatus {
    /// Returns the lowercase wire representation (`"upcoming"`, `"available"`, `"closed"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Available => "available",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One elective activity within a flex period, with a seat capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexOption {
    /// Identifier, unique within the parent period.
    pub id: OptionId,
    /// Activity title shown to students.
    pub title: String,
    /// Room or location.
    pub room: String,
    /// Supervising teacher.
    pub teacher: String,
    /// Maximum number of enrolled students.
    pub capacity: u32,
    /// Enrolled students. Set semantics: a student id appears at most once,
    /// maintained by [`FlexOption::enroll`] / [`FlexOption::withdraw`].
    pub enrolled: Vec<StudentId>,
}

impl FlexOption {
    /// Creates an empty option.
    pub fn new(
        id: OptionId,
        title: impl Into<String>,
        room: impl Into<String>,
        teacher: impl Into<String>,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            room: room.into(),
            teacher: teacher.into(),
            capacity,
            enrolled: Vec::new(),
        }
    }

    /// Number of occupied seats.
    #[must_use]
    pub fn seats_taken(&self) -> usize {
        self.enrolled.len()
    }

    /// Whether the option has no free seat left.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.enrolled.len() >= self.capacity as usize
    }

    /// Whether the given student occupies a seat in this option.
    #[must_use]
    pub fn is_enrolled(&self, student_id: StudentId) -> bool {
        self.enrolled.contains(&student_id)
    }

    /// Adds the student, preserving set semantics.
    fn enroll(&mut self, student_id: StudentId) {
        if !self.enrolled.contains(&student_id) {
            self.enrolled.push(student_id);
        }
    }

    /// Removes the student if present.
    fn withdraw(&mut self, student_id: StudentId) {
        self.enrolled.retain(|s| *s != student_id);
    }
}

/// How a committed registration changed the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// The student was not enrolled anywhere in this period and now is.
    Enrolled,
    /// The student's enrollment moved here from another option in the same
    /// period; the vacated option is reported.
    Transferred {
        /// The option the student left.
        from: OptionId,
    },
    /// The student was already enrolled in the target option. Idempotent
    /// success: no structural change, no version bump.
    Unchanged,
}

/// The outcome of a committed registration transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Period the registration applies to.
    pub period_id: PeriodId,
    /// Option the student now occupies.
    pub option_id: OptionId,
    /// The registered student.
    pub student_id: StudentId,
    /// How the aggregate changed.
    pub status: RegistrationStatus,
}

/// A flex period aggregate: identity, lifecycle status, options, and the
/// version counter that orders commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexPeriod {
    /// Stable identifier.
    pub id: PeriodId,
    /// Display name, e.g. "Flex 2".
    pub name: String,
    /// Lifecycle status.
    pub status: PeriodStatus,
    /// Options in stable display order.
    pub options: Vec<FlexOption>,
    /// Bumped on every committed mutation; the unit of optimistic
    /// concurrency control.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last committed mutation.
    pub updated_at: DateTime<Utc>,
}

impl FlexPeriod {
    /// Creates a fresh aggregate at version 0.
    pub fn new(
        id: PeriodId,
        name: impl Into<String>,
        status: PeriodStatus,
        options: Vec<FlexOption>,
    ) -> Self {
        let now = Utc::now();
        Self { id, name: name.into(), status, options, version: 0, created_at: now, updated_at: now }
    }

    /// Returns the option with the given id, if present.
    #[must_use]
    pub fn option(&self, option_id: OptionId) -> Option<&FlexOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    fn option_mut(&mut self, option_id: OptionId) -> Option<&mut FlexOption> {
        self.options.iter_mut().find(|o| o.id == option_id)
    }

    /// Returns the option the student currently occupies in this period, if any.
    #[must_use]
    pub fn enrollment_of(&self, student_id: StudentId) -> Option<OptionId> {
        self.options.iter().find(|o| o.is_enrolled(student_id)).map(|o| o.id)
    }

    /// Applies a registration to this aggregate in place.
    ///
    /// This is the pure state transition of the registration transaction,
    /// evaluated against one consistent copy of the aggregate:
    ///
    /// 1. The period must be `Available`.
    /// 2. The target option must exist.
    /// 3. Re-registering in the currently occupied option is an idempotent
    ///    success (`Unchanged`) with no mutation.
    /// 4. Any enrollment in *another* option of this period is withdrawn
    ///    before the admission check, so a transfer out of a full option is
    ///    not double-counted against capacity.
    /// 5. The admission check rejects a full target; the student is enrolled
    ///    otherwise.
    ///
    /// Callers must apply this to a scratch copy and discard the copy on
    /// error: after `OptionFull` the prior withdrawal (step 4) is present in
    /// `self`, and atomicity comes from never installing a failed copy.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotAvailable`, `OptionNotFound`, or `OptionFull`.
    pub fn apply_registration(
        &mut self,
        option_id: OptionId,
        student_id: StudentId,
    ) -> Result<RegistrationStatus, RegistryError> {
        if self.status != PeriodStatus::Available {
            return Err(RegistryError::PeriodNotAvailable {
                period_id: self.id,
                status: self.status,
            });
        }

        if self.option(option_id).is_none() {
            return Err(RegistryError::OptionNotFound { period_id: self.id, option_id });
        }

        let current = self.enrollment_of(student_id);
        if current == Some(option_id) {
            return Ok(RegistrationStatus::Unchanged);
        }

        // Vacate the prior slot first; the admission check below must see
        // the seat as free when the student transfers within the period.
        if let Some(from) = current {
            if let Some(prior) = self.option_mut(from) {
                prior.withdraw(student_id);
            }
        }

        let Some(target) = self.option_mut(option_id) else {
            return Err(RegistryError::OptionNotFound { period_id: self.id, option_id });
        };
        if target.is_full() {
            return Err(RegistryError::OptionFull { option_id, capacity: target.capacity });
        }
        target.enroll(student_id);

        Ok(match current {
            Some(from) => RegistrationStatus::Transferred { from },
            None => RegistrationStatus::Enrolled,
        })
    }
}
