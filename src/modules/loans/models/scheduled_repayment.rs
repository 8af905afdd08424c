use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, CurrencyCode, Result};

/// Installment status, a pure function of outstanding vs. original amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Untouched: outstanding equals the original amount
    Due,
    /// Partially paid down
    Partial,
    /// Outstanding reached zero; terminal
    Repaid,
}

impl InstallmentStatus {
    /// Derive the status from the outstanding balance
    ///
    /// Idempotent: re-deriving from an unchanged balance yields the same
    /// status.
    pub fn derive(outstanding_amount: i64, amount: i64) -> Self {
        if outstanding_amount == 0 {
            InstallmentStatus::Repaid
        } else if outstanding_amount < amount {
            InstallmentStatus::Partial
        } else {
            InstallmentStatus::Due
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Partial => "partial",
            Self::Repaid => "repaid",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for InstallmentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "due" => Ok(Self::Due),
            "partial" => Ok(Self::Partial),
            "repaid" => Ok(Self::Repaid),
            _ => Err(format!("Invalid installment status: {}", value)),
        }
    }
}

/// One due date's obligation within a loan's schedule
///
/// All installments for a loan are created together at origination, in
/// due-date order; only the repayment allocator mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledRepayment {
    pub id: Uuid,
    pub loan_id: Uuid,
    /// Amount owed at origination
    pub amount: i64,
    /// Unpaid remainder; monotonically non-increasing
    pub outstanding_amount: i64,
    /// Inherited from the loan at creation
    pub currency_code: CurrencyCode,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ScheduledRepayment {
    /// Create a new installment with the full amount outstanding
    ///
    /// A schedule may contain zero-amount installments when the principal
    /// does not stretch across every period; those are created already
    /// settled. Only negative amounts are invalid.
    pub fn new(
        loan_id: Uuid,
        amount: i64,
        currency_code: CurrencyCode,
        due_date: NaiveDate,
    ) -> Result<Self> {
        if amount < 0 {
            return Err(AppError::validation(
                "Installment amount must not be negative.",
            ));
        }

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4(),
            loan_id,
            amount,
            outstanding_amount: amount,
            currency_code,
            due_date,
            status: InstallmentStatus::derive(amount, amount),
            created_at: now,
            updated_at: now,
        })
    }

    /// Absorb part of a repayment; returns the amount actually applied
    ///
    /// Never applies more than the outstanding balance. Re-derives the
    /// status after the mutation.
    pub fn apply(&mut self, amount: i64) -> i64 {
        let applied = self.outstanding_amount.min(amount.max(0));
        if applied == 0 {
            return 0;
        }

        self.outstanding_amount -= applied;
        self.status = InstallmentStatus::derive(self.outstanding_amount, self.amount);
        self.updated_at = chrono::Utc::now().naive_utc();

        applied
    }

    pub fn is_settled(&self) -> bool {
        self.outstanding_amount == 0
    }
}
