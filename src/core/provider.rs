//! Exchange rate source abstraction

use crate::core::dates::DateKey;
use crate::core::error::RateError;
use crate::core::rates::RawRateRecord;
use async_trait::async_trait;

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, date: &DateKey) -> Result<RawRateRecord, RateError>;
}
