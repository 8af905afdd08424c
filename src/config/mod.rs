use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;

use crate::core::{AppError, CurrencyCode, Result};

/// What to do with a repayment amount left over after every installment is
/// settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentPolicy {
    /// Fail the whole repayment; nothing is persisted
    Reject,
    /// Absorb the excess and log a warning
    WriteOff,
}

impl std::str::FromStr for OverpaymentPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(OverpaymentPolicy::Reject),
            "write_off" | "writeoff" => Ok(OverpaymentPolicy::WriteOff),
            _ => Err(format!("Invalid overpayment policy: {}", s)),
        }
    }
}

/// Deployment configuration for the lending core
///
/// The allowed term and currency sets are closed per deployment; business
/// code validates against them instead of hard-coding the reference values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingConfig {
    /// Term counts (in months) a loan may be originated with
    pub allowed_terms: BTreeSet<u32>,
    /// Currency codes accepted for loans and repayments
    pub allowed_currencies: BTreeSet<CurrencyCode>,
    pub overpayment_policy: OverpaymentPolicy,
}

impl Default for LendingConfig {
    fn default() -> Self {
        let allowed_currencies = ["SGD", "VND"]
            .iter()
            .map(|code| CurrencyCode::new(code).expect("reference currency code"))
            .collect();

        Self {
            allowed_terms: BTreeSet::from([3, 6]),
            allowed_currencies,
            overpayment_policy: OverpaymentPolicy::Reject,
        }
    }
}

impl LendingConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables, all optional (defaults in parentheses):
    /// - `LENDING_ALLOWED_TERMS`: comma-separated month counts ("3,6")
    /// - `LENDING_ALLOWED_CURRENCIES`: comma-separated codes ("SGD,VND")
    /// - `LENDING_OVERPAYMENT_POLICY`: "reject" or "write_off" ("reject")
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let allowed_terms = match env::var("LENDING_ALLOWED_TERMS") {
            Ok(raw) => parse_terms(&raw)?,
            Err(_) => defaults.allowed_terms,
        };

        let allowed_currencies = match env::var("LENDING_ALLOWED_CURRENCIES") {
            Ok(raw) => parse_currencies(&raw)?,
            Err(_) => defaults.allowed_currencies,
        };

        let overpayment_policy = match env::var("LENDING_OVERPAYMENT_POLICY") {
            Ok(raw) => raw.parse().map_err(AppError::Configuration)?,
            Err(_) => defaults.overpayment_policy,
        };

        let config = Self {
            allowed_terms,
            allowed_currencies,
            overpayment_policy,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.allowed_terms.is_empty() {
            return Err(AppError::configuration(
                "At least one loan term must be allowed",
            ));
        }

        if self.allowed_terms.contains(&0) {
            return Err(AppError::configuration("Loan terms must be greater than 0"));
        }

        if self.allowed_currencies.is_empty() {
            return Err(AppError::configuration(
                "At least one currency must be allowed",
            ));
        }

        Ok(())
    }

    pub fn term_allowed(&self, term_count: u32) -> bool {
        self.allowed_terms.contains(&term_count)
    }

    pub fn currency_allowed(&self, currency: &CurrencyCode) -> bool {
        self.allowed_currencies.contains(currency)
    }

    /// Allowed terms as a comma-separated list for error messages
    pub fn allowed_terms_display(&self) -> String {
        self.allowed_terms
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Allowed currency codes as a comma-separated list for error messages
    pub fn allowed_currencies_display(&self) -> String {
        self.allowed_currencies
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn parse_terms(raw: &str) -> Result<BTreeSet<u32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|_| {
                AppError::configuration(format!("Invalid term in LENDING_ALLOWED_TERMS: {}", part))
            })
        })
        .collect()
}

fn parse_currencies(raw: &str) -> Result<BTreeSet<CurrencyCode>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| CurrencyCode::new(part).map_err(AppError::Configuration))
        .collect()
}
