//! Calendar dates as understood by the rates API

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use std::fmt::Display;
use std::str::FromStr;

const DATE_FORMAT: &str = "%d.%m.%Y";

/// A calendar day, printed as `dd.mm.yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        DateKey(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(DateKey)
            .with_context(|| format!("Invalid date, expected dd.mm.yyyy: {s}"))
    }
}

/// Returns `count` consecutive days ending at `today`, most recent first.
pub fn date_range(today: NaiveDate, count: u32) -> Vec<DateKey> {
    (0..count)
        .filter_map(|offset| today.checked_sub_days(Days::new(offset.into())))
        .map(DateKey)
        .collect()
}

/// Same as [`date_range`], anchored at the local calendar date.
pub fn recent_dates(count: u32) -> Vec<DateKey> {
    date_range(Local::now().date_naive(), count)
}
