use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, CurrencyCode, Result};

/// Loan status, a pure function of the outstanding balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Outstanding balance remains
    Due,
    /// Fully settled; terminal
    Repaid,
}

impl LoanStatus {
    /// Derive the status from an outstanding balance
    ///
    /// Idempotent: deriving twice from the same balance yields the same
    /// status.
    pub fn derive(outstanding_amount: i64) -> Self {
        if outstanding_amount == 0 {
            LoanStatus::Repaid
        } else {
            LoanStatus::Due
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Repaid => "repaid",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "due" => Ok(Self::Due),
            "repaid" => Ok(Self::Repaid),
            _ => Err(format!("Invalid loan status: {}", value)),
        }
    }
}

/// One originated credit extension
///
/// Amounts are minor-unit integers in the loan currency. `total_repaid` is
/// the single authoritative paid-to-date counter; `outstanding_amount` always
/// equals `amount - total_repaid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Principal at origination
    pub amount: i64,
    /// Number of monthly installments
    pub term_count: u32,
    /// Unpaid remainder of the principal; monotonically non-increasing
    pub outstanding_amount: i64,
    /// Total repaid to date in loan currency; monotonically non-decreasing
    pub total_repaid: i64,
    pub currency_code: CurrencyCode,
    /// Origination date; the schedule starts one month after it
    pub processed_at: NaiveDate,
    pub status: LoanStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Loan {
    /// Create a new loan with status `due` and the full principal outstanding
    ///
    /// Membership of `term_count` and `currency_code` in the deployment's
    /// allowed sets is the service boundary's responsibility; this
    /// constructor only rejects values no deployment could accept.
    pub fn new(
        user_id: Uuid,
        amount: i64,
        currency_code: CurrencyCode,
        term_count: u32,
        processed_at: NaiveDate,
    ) -> Result<Self> {
        if amount <= 0 {
            return Err(AppError::validation("Amount must be greater than 0."));
        }

        if term_count == 0 {
            return Err(AppError::validation(
                "Loan term must be at least 1 month.",
            ));
        }

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            term_count,
            outstanding_amount: amount,
            total_repaid: 0,
            currency_code,
            processed_at,
            status: LoanStatus::Due,
            created_at: now,
            updated_at: now,
        })
    }

    /// Record an allocated repayment amount and re-derive the status
    ///
    /// `applied` is the portion of a normalized payment the allocator
    /// actually absorbed, never more than the outstanding balance.
    pub fn register_payment(&mut self, applied: i64) -> Result<()> {
        if applied < 0 {
            return Err(AppError::internal(format!(
                "Applied repayment amount cannot be negative: {}",
                applied
            )));
        }

        if applied > self.outstanding_amount {
            return Err(AppError::internal(format!(
                "Applied repayment {} exceeds outstanding balance {}",
                applied, self.outstanding_amount
            )));
        }

        self.total_repaid += applied;
        self.outstanding_amount = self.amount - self.total_repaid;
        self.status = LoanStatus::derive(self.outstanding_amount);
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    pub fn is_repaid(&self) -> bool {
        self.status == LoanStatus::Repaid
    }
}
