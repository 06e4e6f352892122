//! Flex period fixtures shaped like real seed data.
//!
//! Builders for aggregates used across store and server tests, so each test
//! file doesn't re-invent its own period layout.

use flexreg_types::{FlexOption, FlexPeriod, OptionId, PeriodId, PeriodStatus};

/// Builds an option with the given id, title, and capacity, using fixed
/// room/teacher values (tests rarely care about either).
#[must_use]
pub fn option(id: i64, title: &str, capacity: u32) -> FlexOption {
    FlexOption::new(OptionId::new(id), title, "Room 201", "Ms. Johnson", capacity)
}

/// Builds an `available` period with the given options.
#[must_use]
pub fn available_period(id: i64, name: &str, options: Vec<FlexOption>) -> FlexPeriod {
    FlexPeriod::new(PeriodId::new(id), name, PeriodStatus::Available, options)
}

/// Builds a period with an explicit status.
#[must_use]
pub fn period_with_status(
    id: i64,
    name: &str,
    status: PeriodStatus,
    options: Vec<FlexOption>,
) -> FlexPeriod {
    FlexPeriod::new(PeriodId::new(id), name, status, options)
}

/// A realistic period set mirroring a term's seed data: one open period with
/// several options, one open period with a single option, and one upcoming
/// period with no options yet.
#[must_use]
pub fn sample_periods() -> Vec<FlexPeriod> {
    vec![
        available_period(
            2,
            "Flex 2",
            vec![
                FlexOption::new(OptionId::new(1), "Study Hall", "Room 201", "Ms. Johnson", 30),
                FlexOption::new(OptionId::new(2), "Math Help", "Room 103", "Mr. Smith", 20),
                FlexOption::new(OptionId::new(3), "Science Lab", "Room 305", "Dr. Miller", 15),
                FlexOption::new(OptionId::new(4), "Chess Club", "Library", "Mr. Thompson", 12),
            ],
        ),
        available_period(
            3,
            "Flex 3",
            vec![FlexOption::new(OptionId::new(1), "Quiet Study", "Room 101", "Mr. Lee", 25)],
        ),
        period_with_status(4, "Flex 4", PeriodStatus::Upcoming, vec![]),
    ]
}
