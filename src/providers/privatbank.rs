use crate::core::config::ProviderConfig;
use crate::core::dates::DateKey;
use crate::core::error::RateError;
use crate::core::provider::RateProvider;
use crate::core::rates::RawRateRecord;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, instrument};

const ARCHIVE_ENDPOINT: &str = "/p24api/exchange_rates";

// PrivatBankProvider implementation for RateProvider
pub struct PrivatBankProvider {
    base_url: String,
    client: reqwest::Client,
}

impl PrivatBankProvider {
    /// Builds a provider with its own connection pool, released on drop.
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("pbrates/1.0")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(PrivatBankProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, date: &DateKey) -> String {
        format!("{}{}?json&date={}", self.base_url, ARCHIVE_ENDPOINT, date)
    }
}

#[async_trait]
impl RateProvider for PrivatBankProvider {
    #[instrument(
        name = "PrivatBankRatesFetch",
        skip(self),
        fields(date = %date)
    )]
    async fn fetch_rates(&self, date: &DateKey) -> Result<RawRateRecord, RateError> {
        let url = self.url_for(date);
        debug!("Requesting exchange rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RateError::Request {
                date: *date,
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RateError::Http {
                date: *date,
                status,
            });
        }

        let text = response.text().await.map_err(|source| RateError::Request {
            date: *date,
            source,
        })?;

        match serde_json::from_str::<RawRateRecord>(&text) {
            Ok(record) => Ok(record),
            Err(source) => {
                error!(
                    error = ?source,
                    response = %text,
                    "Failed to parse exchange rate response"
                );
                Err(RateError::Decode {
                    date: *date,
                    source,
                })
            }
        }
    }
}
