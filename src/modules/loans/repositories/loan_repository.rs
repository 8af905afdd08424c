use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::loans::models::{Loan, ReceivedRepayment, ScheduledRepayment};

/// Fully materialized snapshot of a loan and its schedule
///
/// The allocator and status machines operate on this in-memory snapshot for
/// the duration of one orchestration call; the service alone decides what
/// gets persisted back.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanAggregate {
    pub loan: Loan,
    /// In due-date ascending order
    pub installments: Vec<ScheduledRepayment>,
}

/// Persistence collaborator for loan aggregates
///
/// Both write operations are atomic multi-record saves: either every record
/// they name persists, or none does.
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Persist a new loan together with its full schedule
    async fn insert_aggregate(
        &self,
        loan: &Loan,
        installments: &[ScheduledRepayment],
    ) -> Result<()>;

    /// Load a loan with its installments in due-date order
    async fn load_aggregate(&self, loan_id: Uuid) -> Result<Option<LoanAggregate>>;

    /// Persist the outcome of one repayment: the updated loan, every touched
    /// installment, and the new payment record
    async fn save_repayment(
        &self,
        loan: &Loan,
        installments: &[ScheduledRepayment],
        received: &ReceivedRepayment,
    ) -> Result<()>;

    /// Payment ledger for a loan, oldest first
    async fn received_for_loan(&self, loan_id: Uuid) -> Result<Vec<ReceivedRepayment>>;
}

struct StoredAggregate {
    loan: Loan,
    installments: Vec<ScheduledRepayment>,
    received: Vec<ReceivedRepayment>,
}

/// In-memory reference implementation
///
/// Each write swaps the whole aggregate under the store's write lock, giving
/// the same all-or-nothing behavior a database transaction would.
#[derive(Default)]
pub struct InMemoryLoanRepository {
    loans: RwLock<HashMap<Uuid, StoredAggregate>>,
}

impl InMemoryLoanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored loans; used by tests to assert all-or-nothing writes
    pub async fn loan_count(&self) -> usize {
        self.loans.read().await.len()
    }
}

#[async_trait]
impl LoanRepository for InMemoryLoanRepository {
    async fn insert_aggregate(
        &self,
        loan: &Loan,
        installments: &[ScheduledRepayment],
    ) -> Result<()> {
        let mut loans = self.loans.write().await;

        if loans.contains_key(&loan.id) {
            return Err(AppError::internal(format!(
                "Loan {} already exists",
                loan.id
            )));
        }

        let mut installments = installments.to_vec();
        installments.sort_by_key(|installment| installment.due_date);

        loans.insert(
            loan.id,
            StoredAggregate {
                loan: loan.clone(),
                installments,
                received: Vec::new(),
            },
        );

        Ok(())
    }

    async fn load_aggregate(&self, loan_id: Uuid) -> Result<Option<LoanAggregate>> {
        let loans = self.loans.read().await;

        Ok(loans.get(&loan_id).map(|stored| LoanAggregate {
            loan: stored.loan.clone(),
            installments: stored.installments.clone(),
        }))
    }

    async fn save_repayment(
        &self,
        loan: &Loan,
        installments: &[ScheduledRepayment],
        received: &ReceivedRepayment,
    ) -> Result<()> {
        let mut loans = self.loans.write().await;

        let stored = loans
            .get_mut(&loan.id)
            .ok_or_else(|| AppError::not_found(format!("Loan {}", loan.id)))?;

        stored.loan = loan.clone();
        stored.installments = installments.to_vec();
        stored.installments.sort_by_key(|installment| installment.due_date);
        stored.received.push(received.clone());

        Ok(())
    }

    async fn received_for_loan(&self, loan_id: Uuid) -> Result<Vec<ReceivedRepayment>> {
        let loans = self.loans.read().await;

        let stored = loans
            .get(&loan_id)
            .ok_or_else(|| AppError::not_found(format!("Loan {}", loan_id)))?;

        Ok(stored.received.clone())
    }
}
