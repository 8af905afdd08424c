// Unit tests for amortization schedule generation

use chrono::NaiveDate;
use lendcore::loans::services::ScheduleGenerator;
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_rounding_remainder_concentrates_on_last_installment() {
    let entries = ScheduleGenerator::generate(1000, 3, date(2024, 1, 20)).unwrap();
    let amounts: Vec<i64> = entries.iter().map(|e| e.amount).collect();

    assert_eq!(amounts, vec![333, 333, 334]);
}

#[test]
fn test_exact_division_leaves_no_remainder() {
    let entries = ScheduleGenerator::generate(1200, 6, date(2024, 1, 20)).unwrap();
    let amounts: Vec<i64> = entries.iter().map(|e| e.amount).collect();

    assert_eq!(amounts, vec![200, 200, 200, 200, 200, 200]);
}

#[test]
fn test_schedule_length_matches_term() {
    assert_eq!(
        ScheduleGenerator::generate(5000, 3, date(2024, 5, 1))
            .unwrap()
            .len(),
        3
    );
    assert_eq!(
        ScheduleGenerator::generate(5000, 6, date(2024, 5, 1))
            .unwrap()
            .len(),
        6
    );
}

#[test]
fn test_due_dates_are_monthly_from_start_date() {
    let entries = ScheduleGenerator::generate(600, 6, date(2024, 5, 15)).unwrap();

    let expected = [
        date(2024, 6, 15),
        date(2024, 7, 15),
        date(2024, 8, 15),
        date(2024, 9, 15),
        date(2024, 10, 15),
        date(2024, 11, 15),
    ];

    for (entry, expected) in entries.iter().zip(expected) {
        assert_eq!(entry.due_date, expected);
    }
}

#[test]
fn test_due_dates_clamp_to_month_end() {
    // starting on Jan 31 the February installment falls on the 29th (leap)
    let entries = ScheduleGenerator::generate(900, 3, date(2024, 1, 31)).unwrap();

    assert_eq!(entries[0].due_date, date(2024, 2, 29));
    assert_eq!(entries[1].due_date, date(2024, 3, 31));
    assert_eq!(entries[2].due_date, date(2024, 4, 30));
}

#[test]
fn test_single_minor_unit_principal() {
    let entries = ScheduleGenerator::generate(1, 3, date(2024, 1, 20)).unwrap();
    let amounts: Vec<i64> = entries.iter().map(|e| e.amount).collect();

    // everything lands on the last installment
    assert_eq!(amounts, vec![0, 0, 1]);
    assert_eq!(amounts.iter().sum::<i64>(), 1);
}

#[test]
fn test_degenerate_inputs_rejected() {
    assert!(ScheduleGenerator::generate(0, 3, date(2024, 1, 20)).is_err());
    assert!(ScheduleGenerator::generate(-1, 6, date(2024, 1, 20)).is_err());
    assert!(ScheduleGenerator::generate(1000, 0, date(2024, 1, 20)).is_err());
}

proptest! {
    /// Installment amounts always sum to the principal exactly, with no
    /// rounding leakage
    #[test]
    fn prop_amounts_sum_to_principal(
        principal in 1i64..100_000_000i64,
        term_count in 1u32..=12u32,
    ) {
        let entries = ScheduleGenerator::generate(
            principal,
            term_count,
            date(2024, 1, 20),
        ).unwrap();

        let total: i64 = entries.iter().map(|e| e.amount).sum();
        prop_assert_eq!(total, principal);
        prop_assert_eq!(entries.len(), term_count as usize);
    }

    /// All installments before the last are equal; only the last carries
    /// the remainder
    #[test]
    fn prop_remainder_never_round_robined(
        principal in 1i64..100_000_000i64,
        term_count in 2u32..=12u32,
    ) {
        let entries = ScheduleGenerator::generate(
            principal,
            term_count,
            date(2024, 1, 20),
        ).unwrap();

        let base = principal / i64::from(term_count);
        for entry in &entries[..entries.len() - 1] {
            prop_assert_eq!(entry.amount, base);
        }
        prop_assert!(entries.last().unwrap().amount >= base);
    }

    /// Due dates are strictly increasing
    #[test]
    fn prop_due_dates_strictly_increasing(
        principal in 1i64..1_000_000i64,
        term_count in 2u32..=12u32,
        day in 1u32..=28u32,
    ) {
        let entries = ScheduleGenerator::generate(
            principal,
            term_count,
            date(2024, 3, day),
        ).unwrap();

        for pair in entries.windows(2) {
            prop_assert!(pair[0].due_date < pair[1].due_date);
        }
    }
}
