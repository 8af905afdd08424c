use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::core::{AppError, CurrencyCode, Result};

/// Pluggable source of exchange rates
///
/// A production deployment backs this with a rate table or market feed; the
/// converter never cares where the rate comes from.
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// Multiplier taking minor units of `from` to minor units of `to`
    async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal>;
}

/// Rate source returning the same rate for every currency pair
///
/// The default rate of 1 is a placeholder: cross-currency amounts pass
/// through unconverted until a real source is plugged in.
pub struct FixedRateSource {
    rate: Decimal,
}

impl FixedRateSource {
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }
}

impl Default for FixedRateSource {
    fn default() -> Self {
        Self::new(Decimal::ONE)
    }
}

#[async_trait]
impl ExchangeRateSource for FixedRateSource {
    async fn rate(&self, _from: &CurrencyCode, _to: &CurrencyCode) -> Result<Decimal> {
        Ok(self.rate)
    }
}

/// Converts minor-unit amounts between currencies
#[derive(Clone)]
pub struct CurrencyConverter {
    source: Arc<dyn ExchangeRateSource>,
}

impl CurrencyConverter {
    pub fn new(source: Arc<dyn ExchangeRateSource>) -> Self {
        Self { source }
    }

    /// Convert `amount` from one currency to another
    ///
    /// Same-currency conversion is the identity and consults no rate source,
    /// so it can never lose precision or fail on an unavailable rate. Cross
    /// currency, the product is rounded back to a whole minor-unit count.
    pub async fn convert(
        &self,
        amount: i64,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<i64> {
        if from == to {
            return Ok(amount);
        }

        let rate = self.source.rate(from, to).await?;
        if rate <= Decimal::ZERO {
            return Err(AppError::internal(format!(
                "Non-positive exchange rate {} for {} -> {}",
                rate, from, to
            )));
        }

        let converted = (Decimal::from(amount) * rate).round_dp(0);
        converted.to_i64().ok_or_else(|| {
            AppError::internal(format!(
                "Converted amount out of minor-unit range: {} {} at rate {}",
                amount, from, rate
            ))
        })
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::new(Arc::new(FixedRateSource::default()))
    }
}
