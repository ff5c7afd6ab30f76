use super::ui;
use crate::core::batch::{fetch_all, fetch_all_or_abort};
use crate::core::config::{AppConfig, FailurePolicy, MAX_DAYS, TableConfig};
use crate::core::rates::format_records;
use crate::core::{DateKey, FormattedRateRecord, RateError, RateProvider, TableRow, dates};
use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use std::io::Write;
use tracing::{debug, warn};

/// Writes the USD and EUR rates of the last `num_days` days to `out`.
///
/// Nothing is written when the run fails.
pub async fn run<W: Write>(
    config: &AppConfig,
    provider: &dyn RateProvider,
    num_days: i64,
    out: &mut W,
) -> Result<()> {
    let count = match check_day_limit(num_days) {
        Ok(count) => count,
        Err(e) => {
            debug!(error = %e, "Refusing to fetch");
            writeln!(
                out,
                "{}",
                ui::style_text(&format!("Error: {e}"), ui::StyleType::Error)
            )?;
            return Ok(());
        }
    };

    let dates = dates::recent_dates(count);
    let rows = collect_rows(provider, &dates, config.on_error).await?;

    writeln!(out, "{}", render_table(&rows, &config.table))?;
    for row in &rows {
        if let Some(error) = &row.error {
            writeln!(
                out,
                "{}",
                ui::style_text(&format!("{}: {}", row.date, error), ui::StyleType::Subtle)
            )?;
        }
    }
    Ok(())
}

/// Turns the requested day count into the number of days to fetch.
///
/// Negative counts fetch nothing.
pub fn check_day_limit(num_days: i64) -> Result<u32, RateError> {
    if num_days > i64::from(MAX_DAYS) {
        return Err(RateError::DayLimit {
            requested: num_days,
            max: MAX_DAYS,
        });
    }
    Ok(u32::try_from(num_days).unwrap_or(0))
}

/// Parses a day count from the command line.
///
/// Counts too large for `i64` saturate so they still hit the day limit.
pub fn parse_day_count(s: &str) -> Result<i64, String> {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{s}' is not an integer"));
    }
    Ok(s.parse::<i64>().unwrap_or(if s.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

/// Fetches every date and turns the responses into table rows, in date order.
pub async fn collect_rows(
    provider: &dyn RateProvider,
    dates: &[DateKey],
    policy: FailurePolicy,
) -> Result<Vec<TableRow>> {
    let pb = ui::new_progress_bar(dates.len() as u64);
    let on_done = || pb.inc(1);

    let rows = match policy {
        FailurePolicy::Abort => {
            let fetched = fetch_all_or_abort(provider, dates, &on_done).await;
            pb.finish_and_clear();
            let records = fetched.context("Failed to fetch exchange rates")?;

            format_records(&records)
                .iter()
                .map(TableRow::try_from)
                .collect::<Result<Vec<_>, _>>()
                .context("Incomplete exchange rates")?
        }
        FailurePolicy::Partial => {
            let outcomes = fetch_all(provider, dates, &on_done).await;
            pb.finish_and_clear();

            outcomes
                .into_iter()
                .map(|outcome| match outcome.result {
                    Ok(raw) => {
                        let formatted = FormattedRateRecord::from(&raw);
                        TableRow::try_from(&formatted).unwrap_or_else(|e| {
                            warn!(error = %e, "Showing placeholder row");
                            TableRow::unavailable(formatted.date.clone(), &e)
                        })
                    }
                    Err(e) => {
                        warn!(error = %e, "Showing placeholder row");
                        TableRow::unavailable(outcome.date.to_string(), &e)
                    }
                })
                .collect()
        }
    };

    Ok(rows)
}

pub fn render_table(rows: &[TableRow], config: &TableConfig) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(config.headers.iter().map(|h| ui::header_cell(h)));

    for row in rows {
        let has_error = row.error.is_some();
        let (date, usd_sale, usd_purchase, eur_sale, eur_purchase) = row.values();
        table.add_row(vec![
            Cell::new(date),
            ui::rate_cell(usd_sale, &config.placeholder, has_error),
            ui::rate_cell(usd_purchase, &config.placeholder, has_error),
            ui::rate_cell(eur_sale, &config.placeholder, has_error),
            ui::rate_cell(eur_purchase, &config.placeholder, has_error),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::{RatePair, RawRateEntry, RawRateRecord};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(currency: &str, sale: Option<f64>, purchase: Option<f64>) -> RawRateEntry {
        RawRateEntry {
            currency: Some(currency.to_string()),
            sale_rate: sale,
            purchase_rate: purchase,
        }
    }

    // Serves USD, EUR and GBP for every date except the ones listed as failing or EUR-less
    #[derive(Default)]
    struct MockRateProvider {
        failing: Vec<DateKey>,
        without_eur: Vec<DateKey>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        async fn fetch_rates(&self, date: &DateKey) -> Result<RawRateRecord, RateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(date) {
                return Err(RateError::Http {
                    date: *date,
                    status: reqwest::StatusCode::BAD_GATEWAY,
                });
            }

            let mut exchange_rate = vec![
                entry("GBP", Some(50.0), Some(49.0)),
                entry("USD", Some(38.5), Some(38.0)),
            ];
            if !self.without_eur.contains(date) {
                exchange_rate.push(entry("EUR", Some(42.0), None));
            }
            Ok(RawRateRecord {
                date: date.to_string(),
                exchange_rate,
            })
        }
    }

    fn sample_dates(count: u32) -> Vec<DateKey> {
        dates::date_range(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(), count)
    }

    async fn run_to_string(
        provider: &MockRateProvider,
        num_days: i64,
        policy: FailurePolicy,
    ) -> (Result<()>, String) {
        let config = AppConfig {
            on_error: policy,
            ..Default::default()
        };
        let mut out = Vec::new();
        let result = run(&config, provider, num_days, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_day_limit() {
        assert_eq!(check_day_limit(0).unwrap(), 0);
        assert_eq!(check_day_limit(10).unwrap(), 10);
        assert_eq!(check_day_limit(-1).unwrap(), 0);
        assert_eq!(check_day_limit(i64::MIN).unwrap(), 0);
        assert!(matches!(
            check_day_limit(11),
            Err(RateError::DayLimit {
                requested: 11,
                max: 10
            })
        ));
        assert!(matches!(
            check_day_limit(i64::MAX),
            Err(RateError::DayLimit { .. })
        ));
    }

    #[test]
    fn test_parse_day_count() {
        assert_eq!(parse_day_count("3"), Ok(3));
        assert_eq!(parse_day_count("-1"), Ok(-1));
        assert_eq!(parse_day_count("+7"), Ok(7));
        assert_eq!(parse_day_count("4294967296"), Ok(4_294_967_296));
        assert_eq!(
            parse_day_count("99999999999999999999999999"),
            Ok(i64::MAX)
        );
        assert_eq!(
            parse_day_count("-99999999999999999999999999"),
            Ok(i64::MIN)
        );
        assert!(parse_day_count("").is_err());
        assert!(parse_day_count("-").is_err());
        assert!(parse_day_count("3.5").is_err());
        assert!(parse_day_count("ten").is_err());
    }

    #[tokio::test]
    async fn test_too_many_days_prints_message_and_makes_no_requests() {
        let provider = MockRateProvider::default();

        for num_days in [11, 4_294_967_296, i64::MAX] {
            let (result, output) = run_to_string(&provider, num_days, FailurePolicy::Abort).await;

            assert!(result.is_ok());
            assert_eq!(
                output.trim_end(),
                "Error: Кількість днів не може перевищувати 10."
            );
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_negative_days_print_empty_table() {
        let provider = MockRateProvider::default();

        let (result, output) = run_to_string(&provider, -1, FailurePolicy::Abort).await;

        assert!(result.is_ok());
        assert!(output.contains("USD Купівля"));
        assert!(!output.contains("Error"));
        assert!(!output.contains("38.50"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_prints_rows_in_date_order() {
        let provider = MockRateProvider::default();

        let (result, output) = run_to_string(&provider, 2, FailurePolicy::Abort).await;

        assert!(result.is_ok());
        let dates = dates::recent_dates(2);
        let first = output.find(&dates[0].to_string()).unwrap();
        let second = output.find(&dates[1].to_string()).unwrap();
        assert!(first < second);
        assert!(output.contains("38.50"));
        assert!(!output.contains("GBP"));
    }

    #[tokio::test]
    async fn test_aborted_run_prints_nothing() {
        let yesterday = dates::recent_dates(2)[1];
        let provider = MockRateProvider {
            failing: vec![yesterday],
            ..Default::default()
        };

        let (result, output) = run_to_string(&provider, 3, FailurePolicy::Abort).await;

        assert!(result.is_err());
        assert!(output.is_empty(), "unexpected output: {output}");
    }

    #[tokio::test]
    async fn test_partial_run_prints_failure_reason() {
        let today = dates::recent_dates(1)[0];
        let provider = MockRateProvider {
            failing: vec![today],
            ..Default::default()
        };

        let (result, output) = run_to_string(&provider, 2, FailurePolicy::Partial).await;

        assert!(result.is_ok());
        assert!(output.contains("N/A"));
        assert!(output.contains(&format!("{today}: HTTP error 502")));
    }

    #[tokio::test]
    async fn test_zero_days_yields_no_rows() {
        let provider = MockRateProvider::default();

        let rows = collect_rows(&provider, &[], FailurePolicy::Abort)
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rows_follow_date_order() {
        let provider = MockRateProvider::default();
        let dates = sample_dates(3);

        let rows = collect_rows(&provider, &dates, FailurePolicy::Abort)
            .await
            .unwrap();

        let row_dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(row_dates, vec!["10.01.2024", "09.01.2024", "08.01.2024"]);
        assert_eq!(
            rows[0].usd,
            RatePair {
                sale: Some(38.5),
                purchase: Some(38.0)
            }
        );
        assert_eq!(rows[0].eur.purchase, None);
    }

    #[tokio::test]
    async fn test_abort_policy_fails_on_any_error() {
        let dates = sample_dates(3);
        let provider = MockRateProvider {
            failing: vec![dates[2]],
            ..Default::default()
        };

        let result = collect_rows(&provider, &dates, FailurePolicy::Abort).await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch exchange rates"));
        assert!(matches!(
            err.downcast_ref::<RateError>(),
            Some(RateError::Http { .. })
        ));
    }

    #[tokio::test]
    async fn test_abort_policy_fails_on_missing_currency() {
        let dates = sample_dates(2);
        let provider = MockRateProvider {
            without_eur: vec![dates[1]],
            ..Default::default()
        };

        let err = collect_rows(&provider, &dates, FailurePolicy::Abort)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RateError>(),
            Some(RateError::MissingCurrency { .. })
        ));
    }

    #[tokio::test]
    async fn test_partial_policy_keeps_failed_rows() {
        let dates = sample_dates(3);
        let provider = MockRateProvider {
            failing: vec![dates[0]],
            without_eur: vec![dates[2]],
            ..Default::default()
        };

        let rows = collect_rows(&provider, &dates, FailurePolicy::Partial)
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, "10.01.2024");
        assert!(rows[0].error.is_some());
        assert_eq!(rows[0].usd, RatePair::default());
        assert!(rows[1].error.is_none());
        assert_eq!(rows[2].date, "08.01.2024");
        assert!(rows[2].error.as_deref().unwrap().contains("EUR"));
    }

    #[test]
    fn test_render_table() {
        let rows = vec![
            TableRow {
                date: "02.01.2024".to_string(),
                usd: RatePair {
                    sale: Some(38.5),
                    purchase: Some(38.0),
                },
                eur: RatePair {
                    sale: Some(42.0),
                    purchase: None,
                },
                error: None,
            },
            TableRow::unavailable("01.01.2024".to_string(), &"HTTP error"),
        ];

        let rendered = render_table(&rows, &TableConfig::default()).to_string();

        for header in ["Дата", "USD Купівля", "USD Продаж", "EUR Купівля", "EUR Продаж"] {
            assert!(rendered.contains(header), "missing header {header}");
        }
        assert!(rendered.contains("38.50"));
        assert!(rendered.contains("42.00"));
        assert!(rendered.contains("N/A"));
        assert!(!rendered.contains("GBP"));

        let first = rendered.find("02.01.2024").unwrap();
        let second = rendered.find("01.01.2024").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_other_currencies_never_rendered() {
        let provider = MockRateProvider::default();
        let rows = collect_rows(&provider, &sample_dates(2), FailurePolicy::Abort)
            .await
            .unwrap();

        let rendered = render_table(&rows, &TableConfig::default()).to_string();
        assert!(!rendered.contains("GBP"));
        assert!(!rendered.contains("50.00"));
        assert!(!rendered.contains("49.00"));
    }
}
