pub mod loan_repository;

pub use loan_repository::{InMemoryLoanRepository, LoanAggregate, LoanRepository};
