use crate::modules::loans::models::ScheduledRepayment;

/// Result of distributing one normalized payment across a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Total absorbed by installments, never more than the payment
    pub applied_total: i64,
    /// Remainder after every installment reached zero outstanding
    pub excess: i64,
}

/// Distributes a normalized repayment across outstanding installments
///
/// Earliest-due installments are paid down first, modeling standard
/// amortized-loan repayment priority. Pure over the in-memory snapshot: the
/// orchestrator decides what gets persisted.
pub struct RepaymentAllocator;

impl RepaymentAllocator {
    /// Allocate `amount` (loan currency, minor units) oldest-due-first
    ///
    /// `installments` must be in due-date ascending order. Fully settled
    /// installments are skipped; allocation stops as soon as the amount is
    /// exhausted. Whatever cannot be absorbed is returned as `excess` for
    /// the caller's overpayment policy to decide on.
    pub fn allocate(installments: &mut [ScheduledRepayment], amount: i64) -> AllocationOutcome {
        let mut remaining = amount.max(0);
        let mut applied_total = 0;

        for installment in installments.iter_mut() {
            if remaining == 0 {
                break;
            }

            if installment.is_settled() {
                continue;
            }

            let applied = installment.apply(remaining);
            applied_total += applied;
            remaining -= applied;
        }

        AllocationOutcome {
            applied_total,
            excess: remaining,
        }
    }
}
