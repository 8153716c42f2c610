use chrono::NaiveDate;
use domain::{CycleKind, MaintenanceCycle};
use fms_schedule::{ScheduleError, next_due, next_due_for};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

#[test]
fn fixed_offsets() {
    let last = date(2024, 3, 1);
    let cases = [
        (CycleKind::Daily, date(2024, 3, 2)),
        (CycleKind::Weekly, date(2024, 3, 8)),
        (CycleKind::Monthly, date(2024, 4, 1)),
        (CycleKind::Quarterly, date(2024, 6, 1)),
        (CycleKind::SemiAnnual, date(2024, 9, 1)),
        (CycleKind::Annual, date(2025, 3, 1)),
        (CycleKind::BiAnnual, date(2026, 3, 1)),
    ];
    for (kind, expected) in cases {
        assert_eq!(next_due_for(last, kind, None).expect("next"), expected, "{kind}");
    }
}

#[test]
fn month_end_clamps_to_last_day() {
    assert_eq!(
        next_due_for(date(2024, 1, 31), CycleKind::Monthly, None).expect("leap"),
        date(2024, 2, 29)
    );
    assert_eq!(
        next_due_for(date(2023, 1, 31), CycleKind::Monthly, None).expect("non-leap"),
        date(2023, 2, 28)
    );
    assert_eq!(
        next_due_for(date(2024, 2, 29), CycleKind::Annual, None).expect("annual"),
        date(2025, 2, 28)
    );
    assert_eq!(
        next_due_for(date(2024, 8, 31), CycleKind::Quarterly, None).expect("quarter"),
        date(2024, 11, 30)
    );
}

#[test]
fn custom_days_boundaries() {
    let last = date(2024, 1, 1);
    assert_eq!(
        next_due_for(last, CycleKind::Custom, Some(1)).expect("min"),
        date(2024, 1, 2)
    );
    assert_eq!(
        next_due_for(last, CycleKind::Custom, Some(3650)).expect("max"),
        date(2033, 12, 29)
    );
    for days in [None, Some(0), Some(3651)] {
        let err = next_due_for(last, CycleKind::Custom, days).expect_err("invalid");
        assert!(matches!(err, ScheduleError::InvalidCycle(_)));
    }
}

#[test]
fn fixed_kinds_ignore_custom_days() {
    let last = date(2024, 5, 10);
    for kind in CycleKind::ALL.into_iter().filter(|k| *k != CycleKind::Custom) {
        let without = next_due_for(last, kind, None).expect("without");
        let with = next_due_for(last, kind, Some(42)).expect("with");
        let out_of_range = next_due_for(last, kind, Some(0)).expect("ignored");
        assert_eq!(without, with);
        assert_eq!(without, out_of_range);
    }
}

#[test]
fn deterministic_for_same_inputs() {
    let last = date(2024, 1, 31);
    let cycle = MaintenanceCycle::from_parts(CycleKind::SemiAnnual, None).expect("cycle");
    let first = next_due(last, cycle).expect("first");
    let second = next_due(last, cycle).expect("second");
    assert_eq!(first, second);
    assert_eq!(first, date(2024, 7, 31));
}

#[test]
fn out_of_range_is_reported() {
    let err = next_due_for(NaiveDate::MAX, CycleKind::Daily, None).expect_err("overflow");
    assert!(matches!(err, ScheduleError::DateOutOfRange { .. }));
}
