use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{LendingConfig, OverpaymentPolicy};
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::loans::models::{Loan, ReceivedRepayment, ScheduledRepayment};
use crate::modules::loans::repositories::{LoanAggregate, LoanRepository};
use crate::modules::loans::services::{
    CurrencyConverter, RepaymentAllocator, ScheduleGenerator,
};

/// Orchestrator for the loan lifecycle
///
/// Validates inputs at the boundary, originates loans together with their
/// full schedule, and processes repayments end to end: convert, allocate,
/// update balances, re-derive statuses. Balance arithmetic lives in the
/// models and the allocator; this service sequences it and decides what the
/// repository persists.
pub struct LoanService {
    repository: Arc<dyn LoanRepository>,
    converter: CurrencyConverter,
    config: LendingConfig,
    /// Serializes repayments per loan; a loan and its installments form one
    /// consistency unit
    loan_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LoanService {
    pub fn new(
        repository: Arc<dyn LoanRepository>,
        converter: CurrencyConverter,
        config: LendingConfig,
    ) -> Self {
        Self {
            repository,
            converter,
            config,
            loan_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Originate a loan together with its full installment schedule
    ///
    /// # Arguments
    /// * `user_id` - Owning user
    /// * `amount` - Principal in minor units of `currency_code`
    /// * `currency_code` - Must be in the deployment's allowed set
    /// * `term_count` - Must be in the deployment's allowed set
    /// * `processed_at` - Origination date, `YYYY-MM-DD`
    ///
    /// Any validation failure creates zero records; on success the loan and
    /// all its installments are persisted as one atomic aggregate, so a
    /// caller never observes a loan with a partial schedule.
    pub async fn create_loan(
        &self,
        user_id: Uuid,
        amount: i64,
        currency_code: &str,
        term_count: u32,
        processed_at: &str,
    ) -> Result<Loan> {
        if !self.config.term_allowed(term_count) {
            return Err(AppError::validation(format!(
                "Loan terms must be one of: {}.",
                self.config.allowed_terms_display()
            )));
        }

        let currency = self.parse_allowed_currency(currency_code)?;

        if amount <= 0 {
            return Err(AppError::validation("Amount must be greater than 0."));
        }

        let processed_at = parse_date(processed_at)?;

        let loan = Loan::new(user_id, amount, currency.clone(), term_count, processed_at)?;

        let installments: Vec<ScheduledRepayment> =
            ScheduleGenerator::generate(loan.amount, loan.term_count, loan.processed_at)?
                .into_iter()
                .map(|entry| {
                    ScheduledRepayment::new(loan.id, entry.amount, currency.clone(), entry.due_date)
                })
                .collect::<Result<_>>()?;

        self.repository.insert_aggregate(&loan, &installments).await?;

        info!(
            loan_id = %loan.id,
            user_id = %user_id,
            amount,
            term_count,
            currency = %loan.currency_code,
            "Loan originated with full schedule"
        );

        Ok(loan)
    }

    /// Process an incoming repayment against a loan
    ///
    /// # Arguments
    /// * `loan_id` - Loan to repay
    /// * `amount` - Payment amount in minor units of `currency_code`
    /// * `currency_code` - Currency the payment arrived in
    /// * `received_at` - Receipt date, `YYYY-MM-DD`
    ///
    /// The payment is recorded verbatim, normalized to the loan currency,
    /// and allocated oldest-due-first across outstanding installments; loan
    /// and installment statuses are re-derived from the updated balances.
    /// The payment record, the loan balance, and every touched installment
    /// persist in one atomic save, or not at all. Repayments against the
    /// same loan are serialized; different loans proceed in parallel.
    pub async fn repay_loan(
        &self,
        loan_id: Uuid,
        amount: i64,
        currency_code: &str,
        received_at: &str,
    ) -> Result<ReceivedRepayment> {
        if amount <= 0 {
            return Err(AppError::validation("Amount must be greater than 0."));
        }

        let currency = self.parse_allowed_currency(currency_code)?;
        let received_at = parse_date(received_at)?;

        let lock = self.lock_for(loan_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.repay_under_lock(loan_id, amount, currency, received_at)
                .await
        };
        self.evict_lock(loan_id, &lock).await;
        result
    }

    async fn repay_under_lock(
        &self,
        loan_id: Uuid,
        amount: i64,
        currency: CurrencyCode,
        received_at: NaiveDate,
    ) -> Result<ReceivedRepayment> {
        let LoanAggregate {
            mut loan,
            mut installments,
        } = self
            .repository
            .load_aggregate(loan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Loan {}", loan_id)))?;

        let normalized = self
            .converter
            .convert(amount, &currency, &loan.currency_code)
            .await?;

        installments.sort_by_key(|installment| installment.due_date);

        let outcome = RepaymentAllocator::allocate(&mut installments, normalized);

        if outcome.excess > 0 {
            match self.config.overpayment_policy {
                OverpaymentPolicy::Reject => {
                    return Err(AppError::validation(format!(
                        "Repayment exceeds the outstanding balance by {} {}.",
                        outcome.excess, loan.currency_code
                    )));
                }
                OverpaymentPolicy::WriteOff => {
                    warn!(
                        loan_id = %loan.id,
                        excess = outcome.excess,
                        currency = %loan.currency_code,
                        "Repayment exceeds the outstanding balance; excess written off"
                    );
                }
            }
        }

        loan.register_payment(outcome.applied_total)?;

        let received = ReceivedRepayment::new(loan_id, amount, currency, received_at)?;

        self.repository
            .save_repayment(&loan, &installments, &received)
            .await?;

        info!(
            loan_id = %loan.id,
            received = amount,
            normalized,
            applied = outcome.applied_total,
            outstanding = loan.outstanding_amount,
            status = %loan.status,
            "Repayment allocated"
        );

        Ok(received)
    }

    /// Load a loan with its full schedule
    pub async fn get_loan(&self, loan_id: Uuid) -> Result<LoanAggregate> {
        self.repository
            .load_aggregate(loan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Loan {}", loan_id)))
    }

    /// Payment ledger for a loan, oldest first
    pub async fn received_repayments(&self, loan_id: Uuid) -> Result<Vec<ReceivedRepayment>> {
        self.repository.received_for_loan(loan_id).await
    }

    fn parse_allowed_currency(&self, code: &str) -> Result<CurrencyCode> {
        let currency = CurrencyCode::new(code).map_err(AppError::Validation)?;

        if !self.config.currency_allowed(&currency) {
            return Err(AppError::validation(format!(
                "The currency code must be in: {}.",
                self.config.allowed_currencies_display()
            )));
        }

        Ok(currency)
    }

    async fn lock_for(&self, loan_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.loan_locks.lock().await;
        locks
            .entry(loan_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Remove the registry entry when this handle and the registry hold the
    /// only references; a higher count means another repayment is waiting
    async fn evict_lock(&self, loan_id: Uuid, lock: &Arc<Mutex<()>>) {
        let mut locks = self.loan_locks.lock().await;
        if Arc::strong_count(lock) == 2 {
            locks.remove(&loan_id);
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date: {}", raw)))
}
