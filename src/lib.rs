//! Lendcore: installment loan tracking core
//!
//! Originates fixed-term loans, derives their amortization schedules, and
//! allocates incoming repayments against outstanding installments while
//! keeping balances and statuses consistent. Persistence and exchange rates
//! are pluggable collaborators; in-memory and fixed-rate reference
//! implementations ship with the crate.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use crate::config::{LendingConfig, OverpaymentPolicy};
pub use crate::core::{AppError, CurrencyCode, Result};
pub use crate::modules::loans;
