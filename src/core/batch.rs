//! Concurrent fetching of several days at once
//!
//! Every request of a batch is issued before any of them is awaited and the
//! results come back in the order of the requested dates.

use crate::core::dates::DateKey;
use crate::core::error::RateError;
use crate::core::provider::RateProvider;
use crate::core::rates::RawRateRecord;
use futures::future::{join_all, try_join_all};
use tracing::debug;

/// Result of fetching a single day.
#[derive(Debug)]
pub struct FetchOutcome {
    pub date: DateKey,
    pub result: Result<RawRateRecord, RateError>,
}

/// Fetches every date and reports each outcome separately.
pub async fn fetch_all(
    provider: &dyn RateProvider,
    dates: &[DateKey],
    on_done: &(dyn Fn() + Sync),
) -> Vec<FetchOutcome> {
    debug!("Fetching {} dates", dates.len());
    let futures = dates.iter().map(|date| async move {
        let result = provider.fetch_rates(date).await;
        on_done();
        FetchOutcome {
            date: *date,
            result,
        }
    });
    join_all(futures).await
}

/// Fetches every date, failing on the first error.
///
/// Requests still in flight when a failure arrives are dropped.
pub async fn fetch_all_or_abort(
    provider: &dyn RateProvider,
    dates: &[DateKey],
    on_done: &(dyn Fn() + Sync),
) -> Result<Vec<RawRateRecord>, RateError> {
    debug!("Fetching {} dates, aborting on first failure", dates.len());
    let futures = dates.iter().map(|date| async move {
        let result = provider.fetch_rates(date).await;
        on_done();
        result
    });
    try_join_all(futures).await
}
