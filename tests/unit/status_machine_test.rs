// Unit tests for the loan and installment status machines

use chrono::NaiveDate;
use lendcore::loans::models::{
    InstallmentStatus, Loan, LoanStatus, ScheduledRepayment,
};
use lendcore::CurrencyCode;
use proptest::prelude::*;
use uuid::Uuid;

#[test]
fn test_loan_status_bands() {
    assert_eq!(LoanStatus::derive(1000), LoanStatus::Due);
    assert_eq!(LoanStatus::derive(1), LoanStatus::Due);
    assert_eq!(LoanStatus::derive(0), LoanStatus::Repaid);
}

#[test]
fn test_installment_status_bands() {
    assert_eq!(InstallmentStatus::derive(500, 500), InstallmentStatus::Due);
    assert_eq!(
        InstallmentStatus::derive(250, 500),
        InstallmentStatus::Partial
    );
    assert_eq!(InstallmentStatus::derive(1, 500), InstallmentStatus::Partial);
    assert_eq!(InstallmentStatus::derive(0, 500), InstallmentStatus::Repaid);
}

#[test]
fn test_derivation_is_idempotent() {
    for outstanding in [0i64, 1, 250, 500] {
        assert_eq!(
            LoanStatus::derive(outstanding),
            LoanStatus::derive(outstanding)
        );
        assert_eq!(
            InstallmentStatus::derive(outstanding, 500),
            InstallmentStatus::derive(outstanding, 500)
        );
    }
}

#[test]
fn test_entities_start_due() {
    let currency = CurrencyCode::new("SGD").unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();

    let loan = Loan::new(Uuid::new_v4(), 1000, currency.clone(), 3, start).unwrap();
    assert_eq!(loan.status, LoanStatus::Due);

    let installment = ScheduledRepayment::new(loan.id, 333, currency, start).unwrap();
    assert_eq!(installment.status, InstallmentStatus::Due);
}

#[test]
fn test_repaid_is_terminal_under_allocation() {
    let currency = CurrencyCode::new("SGD").unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();

    let mut installment = ScheduledRepayment::new(Uuid::new_v4(), 500, currency, start).unwrap();
    installment.apply(500);
    assert_eq!(installment.status, InstallmentStatus::Repaid);

    // further applications absorb nothing and never leave the terminal state
    installment.apply(100);
    assert_eq!(installment.status, InstallmentStatus::Repaid);
    assert_eq!(installment.outstanding_amount, 0);
}

#[test]
fn test_string_round_trips() {
    for status in [LoanStatus::Due, LoanStatus::Repaid] {
        assert_eq!(
            LoanStatus::try_from(status.as_str().to_string()).unwrap(),
            status
        );
    }

    for status in [
        InstallmentStatus::Due,
        InstallmentStatus::Partial,
        InstallmentStatus::Repaid,
    ] {
        assert_eq!(
            InstallmentStatus::try_from(status.as_str().to_string()).unwrap(),
            status
        );
    }

    assert!(LoanStatus::try_from("overdue".to_string()).is_err());
    assert!(InstallmentStatus::try_from("pending".to_string()).is_err());
}

proptest! {
    /// Status is a pure function of the balances: the three bands partition
    /// the whole range
    #[test]
    fn prop_installment_status_partition(
        amount in 1i64..1_000_000i64,
        outstanding_fraction in 0.0f64..=1.0f64,
    ) {
        let outstanding = ((amount as f64) * outstanding_fraction) as i64;
        let status = InstallmentStatus::derive(outstanding, amount);

        if outstanding == 0 {
            prop_assert_eq!(status, InstallmentStatus::Repaid);
        } else if outstanding < amount {
            prop_assert_eq!(status, InstallmentStatus::Partial);
        } else {
            prop_assert_eq!(status, InstallmentStatus::Due);
        }

        // idempotence
        prop_assert_eq!(status, InstallmentStatus::derive(outstanding, amount));
    }
}
