use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, CurrencyCode, Result};

/// Immutable record of one incoming payment event
///
/// Records the payment verbatim in its own currency, before normalization.
/// Append-only: never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedRepayment {
    pub id: Uuid,
    pub loan_id: Uuid,
    /// Amount in the payment's own currency, minor units
    pub amount: i64,
    pub currency_code: CurrencyCode,
    pub received_at: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl ReceivedRepayment {
    pub fn new(
        loan_id: Uuid,
        amount: i64,
        currency_code: CurrencyCode,
        received_at: NaiveDate,
    ) -> Result<Self> {
        if amount <= 0 {
            return Err(AppError::validation(
                "Repayment amount must be greater than 0.",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            loan_id,
            amount,
            currency_code,
            received_at,
            created_at: chrono::Utc::now().naive_utc(),
        })
    }
}
