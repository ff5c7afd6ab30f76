//! Error kinds raised while fetching and shaping exchange rates

use crate::core::dates::DateKey;
use crate::core::rates::Currency;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("Кількість днів не може перевищувати {max}.")]
    DayLimit { requested: i64, max: u32 },

    #[error("HTTP error {status} while fetching rates for {date}")]
    Http {
        date: DateKey,
        status: reqwest::StatusCode,
    },

    #[error("Request for {date} failed: {source}")]
    Request {
        date: DateKey,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response shape for {date}: {source}")]
    Decode {
        date: DateKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("No {currency} rates published for {date}")]
    MissingCurrency { date: String, currency: Currency },
}
