//! Seed data loading.
//!
//! A seed file describes a term's flex periods in JSON. Identifiers are
//! assigned here (periods numbered from 1 in file order, options numbered
//! from 1 within each period), so seed files stay free of bookkeeping:
//!
//! ```json
//! [
//!   {
//!     "name": "Flex 2",
//!     "status": "available",
//!     "options": [
//!       { "title": "Study Hall", "room": "Room 201", "teacher": "Ms. Johnson", "capacity": 30 }
//!     ]
//!   }
//! ]
//! ```
//!
//! Seeding only touches an empty store; a store with recovered state is
//! never overwritten by a stale seed file.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use snafu::ResultExt;
use tracing::info;

use flexreg_store::{EnrollmentStore, StorageBackend};
use flexreg_types::error::IoSnafu;
use flexreg_types::{
    FlexOption, FlexPeriod, OptionId, PeriodId, PeriodStatus, RegistryError, Result,
};

/// Default option capacity when the seed file omits one.
const DEFAULT_CAPACITY: u32 = 30;

/// One period entry of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedPeriod {
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: PeriodStatus,
    /// Options offered in this period; may be empty for upcoming periods.
    #[serde(default)]
    pub options: Vec<SeedOption>,
}

/// One option entry of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedOption {
    /// Activity title.
    pub title: String,
    /// Room or location.
    #[serde(default)]
    pub room: String,
    /// Supervising teacher.
    #[serde(default)]
    pub teacher: String,
    /// Seat capacity.
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

fn default_capacity() -> u32 {
    DEFAULT_CAPACITY
}

/// Reads and parses a seed file into aggregates with assigned identifiers.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read and `Config` if it does not
/// parse as a seed file.
pub fn load_seed_file(path: &Path) -> Result<Vec<FlexPeriod>> {
    let contents = fs::read_to_string(path).context(IoSnafu)?;
    let entries: Vec<SeedPeriod> = serde_json::from_str(&contents).map_err(|e| {
        RegistryError::Config { message: format!("invalid seed file {}: {e}", path.display()) }
    })?;
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(pi, entry)| {
            let options = entry
                .options
                .into_iter()
                .enumerate()
                .map(|(oi, o)| {
                    FlexOption::new(
                        OptionId::new(oi as i64 + 1),
                        o.title,
                        o.room,
                        o.teacher,
                        o.capacity,
                    )
                })
                .collect();
            FlexPeriod::new(PeriodId::new(pi as i64 + 1), entry.name, entry.status, options)
        })
        .collect())
}

/// Inserts seed periods into an empty store; a non-empty store is left
/// untouched. Returns the number of periods inserted.
///
/// # Errors
///
/// Returns `Io`/`Codec` if persisting a seeded aggregate fails.
pub fn apply_seed<B: StorageBackend>(
    store: &EnrollmentStore<B>,
    periods: Vec<FlexPeriod>,
) -> Result<usize> {
    if !store.is_empty() {
        info!("store already has periods, skipping seed");
        return Ok(0);
    }
    let count = periods.len();
    for period in periods {
        store.insert_period(period)?;
    }
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use flexreg_store::InMemoryBackend;
    use flexreg_test_utils::{fixtures, TestDir};

    use super::*;

    const SEED: &str = r#"[
        {
            "name": "Flex 2",
            "status": "available",
            "options": [
                { "title": "Study Hall", "room": "Room 201", "teacher": "Ms. Johnson", "capacity": 30 },
                { "title": "Chess Club", "room": "Library", "teacher": "Mr. Thompson", "capacity": 12 }
            ]
        },
        { "name": "Flex 4", "status": "upcoming" }
    ]"#;

    fn write_seed(dir: &TestDir, contents: &str) -> std::path::PathBuf {
        let path = dir.join("flexes.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_assigns_sequential_ids() {
        let dir = TestDir::new();
        let periods = load_seed_file(&write_seed(&dir, SEED)).unwrap();

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].id, PeriodId::new(1));
        assert_eq!(periods[0].status, PeriodStatus::Available);
        assert_eq!(periods[0].options.len(), 2);
        assert_eq!(periods[0].options[1].id, OptionId::new(2));
        assert_eq!(periods[0].options[1].capacity, 12);

        assert_eq!(periods[1].id, PeriodId::new(2));
        assert_eq!(periods[1].status, PeriodStatus::Upcoming);
        assert!(periods[1].options.is_empty());
    }

    #[test]
    fn test_capacity_defaults_when_omitted() {
        let dir = TestDir::new();
        let seed = r#"[{ "name": "Flex 3", "status": "available",
                         "options": [{ "title": "Quiet Study" }] }]"#;
        let periods = load_seed_file(&write_seed(&dir, seed)).unwrap();
        assert_eq!(periods[0].options[0].capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn test_malformed_seed_is_a_config_error() {
        let dir = TestDir::new();
        let err = load_seed_file(&write_seed(&dir, "{ not json ]")).unwrap_err();
        assert!(matches!(err, RegistryError::Config { .. }));
    }

    #[test]
    fn test_missing_seed_file_is_an_io_error() {
        let dir = TestDir::new();
        let err = load_seed_file(&dir.join("nope.json")).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }

    #[test]
    fn test_apply_seed_only_touches_empty_store() {
        let dir = TestDir::new();
        let store = EnrollmentStore::open(InMemoryBackend::new()).unwrap();
        let periods = load_seed_file(&write_seed(&dir, SEED)).unwrap();

        assert_eq!(apply_seed(&store, periods.clone()).unwrap(), 2);
        assert_eq!(store.list_periods().len(), 2);

        // Second application is a no-op, not a duplicate or an overwrite.
        assert_eq!(apply_seed(&store, periods).unwrap(), 0);
        assert_eq!(store.list_periods().len(), 2);
    }

    #[test]
    fn test_apply_seed_skips_recovered_store() {
        let store = EnrollmentStore::open(InMemoryBackend::new()).unwrap();
        store.insert_period(fixtures::available_period(7, "Flex 7", vec![])).unwrap();

        assert_eq!(apply_seed(&store, vec![fixtures::available_period(1, "Flex 1", vec![])])
            .unwrap(), 0);
        assert_eq!(store.list_periods()[0].name, "Flex 7");
    }
}
