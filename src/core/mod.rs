//! Core business logic abstractions

pub mod batch;
pub mod config;
pub mod dates;
pub mod error;
pub mod log;
pub mod provider;
pub mod rates;

// Re-export main types for cleaner imports
pub use dates::DateKey;
pub use error::RateError;
pub use provider::RateProvider;
pub use rates::{Currency, FormattedRateRecord, RatePair, RawRateRecord, TableRow};
