//! Exchange rate records: the API schema and the shapes derived from it

use crate::core::error::RateError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Currencies shown in the rates table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Currency {
    Usd,
    Eur,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    // Exact match only, "usd" is not a currency code the API emits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(anyhow::anyhow!("Unsupported currency: {}", s)),
        }
    }
}

/// Response body of the archive endpoint for one day.
///
/// National bank rates and other keys the API sends are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRateRecord {
    pub date: String,
    #[serde(rename = "exchangeRate")]
    pub exchange_rate: Vec<RawRateEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRateEntry {
    pub currency: Option<String>,
    #[serde(rename = "saleRate")]
    pub sale_rate: Option<f64>,
    #[serde(rename = "purchaseRate")]
    pub purchase_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatePair {
    pub sale: Option<f64>,
    pub purchase: Option<f64>,
}

/// USD and EUR rates of one day, keyed by the date the API reported.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedRateRecord {
    pub date: String,
    pub rates: BTreeMap<Currency, RatePair>,
}

impl From<&RawRateRecord> for FormattedRateRecord {
    fn from(raw: &RawRateRecord) -> Self {
        let rates = raw
            .exchange_rate
            .iter()
            .filter_map(|entry| {
                let currency = entry.currency.as_deref()?.parse::<Currency>().ok()?;
                Some((
                    currency,
                    RatePair {
                        sale: entry.sale_rate,
                        purchase: entry.purchase_rate,
                    },
                ))
            })
            .collect();

        FormattedRateRecord {
            date: raw.date.clone(),
            rates,
        }
    }
}

pub fn format_records(raw: &[RawRateRecord]) -> Vec<FormattedRateRecord> {
    raw.iter().map(FormattedRateRecord::from).collect()
}

/// One line of the rates table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: String,
    pub usd: RatePair,
    pub eur: RatePair,
    pub error: Option<String>,
}

impl TableRow {
    /// Row for a day whose rates could not be obtained.
    pub fn unavailable(date: String, reason: &impl Display) -> Self {
        TableRow {
            date,
            usd: RatePair::default(),
            eur: RatePair::default(),
            error: Some(reason.to_string()),
        }
    }

    /// `(date, USD sale, USD purchase, EUR sale, EUR purchase)`
    pub fn values(&self) -> (&str, Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
        (
            &self.date,
            self.usd.sale,
            self.usd.purchase,
            self.eur.sale,
            self.eur.purchase,
        )
    }
}

impl TryFrom<&FormattedRateRecord> for TableRow {
    type Error = RateError;

    fn try_from(record: &FormattedRateRecord) -> Result<Self, Self::Error> {
        let lookup = |currency: Currency| {
            record
                .rates
                .get(&currency)
                .copied()
                .ok_or_else(|| RateError::MissingCurrency {
                    date: record.date.clone(),
                    currency,
                })
        };

        Ok(TableRow {
            date: record.date.clone(),
            usd: lookup(Currency::Usd)?,
            eur: lookup(Currency::Eur)?,
            error: None,
        })
    }
}
