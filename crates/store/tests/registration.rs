//! Registration transaction invariant tests.
//!
//! These tests verify the guarantees the enrollment store must hold across
//! any sequence of commits on one period:
//!
//! - Capacity: an option never holds more students than its capacity,
//!   including under concurrent registration for the last seat
//! - Exclusivity: a student occupies at most one option per period
//! - Idempotence: re-registering in the same option succeeds without change
//! - Transfer: moving between options frees exactly one seat and takes
//!   exactly one, atomically

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::{Arc, Barrier};
use std::thread;

use flexreg_store::{EnrollmentStore, InMemoryBackend};
use flexreg_test_utils::fixtures;
use flexreg_types::{
    OptionId, PeriodId, PeriodStatus, RegistrationStatus, RegistryError, StudentId,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn open_store(periods: Vec<flexreg_types::FlexPeriod>) -> EnrollmentStore<InMemoryBackend> {
    let store = EnrollmentStore::open(InMemoryBackend::new()).expect("open store");
    for period in periods {
        store.insert_period(period).expect("insert period");
    }
    store
}

fn seats(store: &EnrollmentStore<InMemoryBackend>, period: i64, option: i64) -> Vec<StudentId> {
    store
        .get_period(PeriodId::new(period))
        .unwrap()
        .option(OptionId::new(option))
        .unwrap()
        .enrolled
        .clone()
}

// ============================================================================
// Sequential invariants
// ============================================================================

#[test]
fn test_register_then_reject_when_full() {
    let store = open_store(vec![fixtures::available_period(
        1,
        "Flex 2",
        vec![fixtures::option(1, "Chess Club", 1)],
    )]);

    store
        .commit_enrollment(PeriodId::new(1), OptionId::new(1), StudentId::new(100))
        .expect("first student takes the only seat");

    let err = store
        .commit_enrollment(PeriodId::new(1), OptionId::new(1), StudentId::new(200))
        .unwrap_err();
    assert!(matches!(err, RegistryError::OptionFull { .. }));
    assert_eq!(seats(&store, 1, 1), vec![StudentId::new(100)], "the rejected call changed nothing");
}

#[test]
fn test_exclusivity_across_many_registrations() {
    let store = open_store(vec![fixtures::available_period(
        1,
        "Flex 2",
        vec![
            fixtures::option(1, "Study Hall", 30),
            fixtures::option(2, "Math Help", 30),
            fixtures::option(3, "Science Lab", 30),
        ],
    )]);

    // One student bounces through every option; only the last sticks.
    for option in [1, 2, 3, 1, 3] {
        store
            .commit_enrollment(PeriodId::new(1), OptionId::new(option), StudentId::new(7))
            .expect("registration");
    }

    let period = store.get_period(PeriodId::new(1)).unwrap();
    let occupied: Vec<_> =
        period.options.iter().filter(|o| o.is_enrolled(StudentId::new(7))).collect();
    assert_eq!(occupied.len(), 1);
    assert_eq!(occupied[0].id, OptionId::new(3));
}

#[test]
fn test_transfer_moves_exactly_one_seat() {
    let store = open_store(vec![fixtures::available_period(
        1,
        "Flex 2",
        vec![fixtures::option(1, "Study Hall", 10), fixtures::option(2, "Math Help", 10)],
    )]);

    // Background population so the counts are not trivially 0/1.
    for s in 0..4 {
        store.commit_enrollment(PeriodId::new(1), OptionId::new(1), StudentId::new(s)).unwrap();
    }
    for s in 10..13 {
        store.commit_enrollment(PeriodId::new(1), OptionId::new(2), StudentId::new(s)).unwrap();
    }

    let reg = store
        .commit_enrollment(PeriodId::new(1), OptionId::new(2), StudentId::new(0))
        .expect("transfer");
    assert_eq!(reg.status, RegistrationStatus::Transferred { from: OptionId::new(1) });

    assert_eq!(seats(&store, 1, 1).len(), 3, "source lost exactly one seat");
    assert_eq!(seats(&store, 1, 2).len(), 4, "target gained exactly one seat");
    assert!(!seats(&store, 1, 1).contains(&StudentId::new(0)));
    assert!(seats(&store, 1, 2).contains(&StudentId::new(0)));
}

#[test]
fn test_idempotent_reregistration_leaves_enrollment_unchanged() {
    let store = open_store(vec![fixtures::available_period(
        1,
        "Flex 2",
        vec![fixtures::option(1, "Quiet Study", 25)],
    )]);

    let first = store
        .commit_enrollment(PeriodId::new(1), OptionId::new(1), StudentId::new(5))
        .unwrap();
    assert_eq!(first.status, RegistrationStatus::Enrolled);

    let second = store
        .commit_enrollment(PeriodId::new(1), OptionId::new(1), StudentId::new(5))
        .unwrap();
    assert_eq!(second.status, RegistrationStatus::Unchanged);

    assert_eq!(seats(&store, 1, 1), vec![StudentId::new(5)]);
}

#[test]
fn test_upcoming_and_closed_periods_reject_everything() {
    let store = open_store(vec![
        fixtures::period_with_status(
            1,
            "Flex 1",
            PeriodStatus::Upcoming,
            vec![fixtures::option(1, "Study Hall", 30)],
        ),
        fixtures::period_with_status(
            2,
            "Flex 2",
            PeriodStatus::Closed,
            vec![fixtures::option(1, "Study Hall", 30)],
        ),
    ]);

    for period in [1, 2] {
        let err = store
            .commit_enrollment(PeriodId::new(period), OptionId::new(1), StudentId::new(5))
            .unwrap_err();
        assert!(matches!(err, RegistryError::PeriodNotAvailable { .. }));
        assert!(seats(&store, period, 1).is_empty(), "rejection mutated period {period}");
        assert_eq!(store.get_period(PeriodId::new(period)).unwrap().version, 0);
    }
}

#[test]
fn test_cross_period_enrollments_are_independent() {
    let store = open_store(vec![
        fixtures::available_period(1, "Flex 2", vec![fixtures::option(1, "Study Hall", 30)]),
        fixtures::available_period(2, "Flex 3", vec![fixtures::option(1, "Quiet Study", 25)]),
    ]);

    store.commit_enrollment(PeriodId::new(1), OptionId::new(1), StudentId::new(5)).unwrap();
    store.commit_enrollment(PeriodId::new(2), OptionId::new(1), StudentId::new(5)).unwrap();

    // Exclusivity is per period: both enrollments stand.
    assert_eq!(seats(&store, 1, 1), vec![StudentId::new(5)]);
    assert_eq!(seats(&store, 2, 1), vec![StudentId::new(5)]);
}

// ============================================================================
// End-to-end scenario
// ============================================================================

/// Period P1 available, O1 capacity 1 (empty), O2 capacity 2 (empty):
/// S1 takes O1; S2 bounces off the full O1; S1 transfers to O2, freeing O1;
/// S2 now takes O1.
#[test]
fn test_full_registration_scenario() {
    let store = open_store(vec![fixtures::available_period(
        1,
        "Flex 2",
        vec![fixtures::option(1, "Chess Club", 1), fixtures::option(2, "Math Help", 2)],
    )]);
    let (p1, o1, o2) = (PeriodId::new(1), OptionId::new(1), OptionId::new(2));
    let (s1, s2) = (StudentId::new(100), StudentId::new(200));

    store.commit_enrollment(p1, o1, s1).expect("S1 registers for O1");
    assert_eq!(seats(&store, 1, 1), vec![s1]);

    let err = store.commit_enrollment(p1, o1, s2).unwrap_err();
    assert!(matches!(err, RegistryError::OptionFull { .. }), "S2 bounces off full O1");

    store.commit_enrollment(p1, o2, s1).expect("S1 transfers to O2");
    assert!(seats(&store, 1, 1).is_empty());
    assert_eq!(seats(&store, 1, 2), vec![s1]);

    store.commit_enrollment(p1, o1, s2).expect("S2 takes the freed seat in O1");
    assert_eq!(seats(&store, 1, 1), vec![s2]);
}

// ============================================================================
// Concurrency
// ============================================================================

/// Many students race for an option with fewer seats than contenders. After
/// all calls settle the option must hold exactly `capacity` students, every
/// winner must actually be enrolled, and every loser must have seen
/// `OptionFull` — never a torn or over-admitted state.
#[test]
fn test_concurrent_admission_never_exceeds_capacity() {
    const CAPACITY: u32 = 5;
    const CONTENDERS: i64 = 32;

    let store = Arc::new(open_store(vec![fixtures::available_period(
        1,
        "Flex 2",
        vec![fixtures::option(1, "Science Lab", CAPACITY)],
    )]));
    let barrier = Arc::new(Barrier::new(CONTENDERS as usize));

    let handles: Vec<_> = (0..CONTENDERS)
        .map(|s| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.commit_enrollment(PeriodId::new(1), OptionId::new(1), StudentId::new(s))
            })
        })
        .collect();

    let mut committed = 0;
    let mut full = 0;
    for handle in handles {
        match handle.join().expect("thread panicked") {
            Ok(reg) => {
                assert_eq!(reg.status, RegistrationStatus::Enrolled);
                committed += 1;
            }
            Err(RegistryError::OptionFull { .. }) => full += 1,
            Err(other) => panic!("unexpected outcome: {other}"),
        }
    }

    assert_eq!(committed, CAPACITY as usize);
    assert_eq!(full, CONTENDERS as usize - CAPACITY as usize);

    let enrolled = seats(&store, 1, 1);
    assert_eq!(enrolled.len(), CAPACITY as usize);
    let period = store.get_period(PeriodId::new(1)).unwrap();
    assert_eq!(period.version, CAPACITY as u64, "exactly one version bump per commit");
}

/// Students concurrently hop between two options. Whatever the interleaving,
/// exclusivity must hold for every student and no seat may be duplicated or
/// leaked: the total enrollment equals the student count.
#[test]
fn test_concurrent_transfers_preserve_exclusivity() {
    const STUDENTS: i64 = 8;
    const HOPS: usize = 10;

    let store = Arc::new(open_store(vec![fixtures::available_period(
        1,
        "Flex 2",
        vec![
            fixtures::option(1, "Study Hall", STUDENTS as u32),
            fixtures::option(2, "Math Help", STUDENTS as u32),
        ],
    )]));
    let barrier = Arc::new(Barrier::new(STUDENTS as usize));

    let handles: Vec<_> = (0..STUDENTS)
        .map(|s| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for hop in 0..HOPS {
                    let target = if (hop as i64 + s) % 2 == 0 { 1 } else { 2 };
                    // Contention is the one transient outcome; retrying it is
                    // the caller's job, so the test plays that caller.
                    loop {
                        match store.commit_enrollment(
                            PeriodId::new(1),
                            OptionId::new(target),
                            StudentId::new(s),
                        ) {
                            Ok(_) => break,
                            Err(RegistryError::Contention { .. }) => continue,
                            Err(other) => panic!("unexpected outcome: {other}"),
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let period = store.get_period(PeriodId::new(1)).unwrap();
    let total: usize = period.options.iter().map(|o| o.enrolled.len()).sum();
    assert_eq!(total, STUDENTS as usize, "every student holds exactly one seat");
    for s in 0..STUDENTS {
        let occupied: Vec<_> = period
            .options
            .iter()
            .filter(|o| o.is_enrolled(StudentId::new(s)))
            .map(|o| o.id)
            .collect();
        assert_eq!(occupied.len(), 1, "student {s} must occupy exactly one option");
    }
}
