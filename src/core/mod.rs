pub mod currency;
pub mod error;

pub use currency::CurrencyCode;
pub use error::{AppError, Result};
