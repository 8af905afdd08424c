use chrono::{Months, NaiveDate};

use crate::core::{AppError, Result};

/// One entry of a generated amortization schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Installment amount in minor units of the loan currency
    pub amount: i64,
    pub due_date: NaiveDate,
}

/// Derives the installment schedule for a principal over a fixed term
///
/// The principal is split by truncating integer division; the entire
/// remainder lands on the final installment, so the entries always sum to
/// the principal exactly. The remainder is never round-robined across
/// earlier installments.
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// Generate `term_count` monthly installments starting one month after
    /// `start_date`
    ///
    /// The i-th installment (1-indexed) falls due `i` months after
    /// `start_date`, with the day clamped to the end of shorter months.
    /// Screening `principal` and `term_count` against the deployment's
    /// allowed sets is the caller's responsibility.
    pub fn generate(
        principal: i64,
        term_count: u32,
        start_date: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>> {
        if principal <= 0 {
            return Err(AppError::validation("Amount must be greater than 0."));
        }

        if term_count == 0 {
            return Err(AppError::validation(
                "Loan term must be at least 1 month.",
            ));
        }

        let base = principal / i64::from(term_count);
        let remainder = principal % i64::from(term_count);

        let mut entries = Vec::with_capacity(term_count as usize);
        for i in 1..=term_count {
            let amount = if i == term_count {
                base + remainder
            } else {
                base
            };

            let due_date = start_date
                .checked_add_months(Months::new(i))
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "Due date out of calendar range: {} + {} months",
                        start_date, i
                    ))
                })?;

            entries.push(ScheduleEntry { amount, due_date });
        }

        Ok(entries)
    }
}
