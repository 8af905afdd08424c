pub mod currency_converter;
pub mod loan_service;
pub mod repayment_allocator;
pub mod schedule_generator;

pub use currency_converter::{CurrencyConverter, ExchangeRateSource, FixedRateSource};
pub use loan_service::LoanService;
pub use repayment_allocator::{AllocationOutcome, RepaymentAllocator};
pub use schedule_generator::{ScheduleEntry, ScheduleGenerator};
