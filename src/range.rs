use crate::errors::RangeError;
use crate::models::{Record, SelectionQuery};
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How many days back to look for the most recent day with activity.
const LOOKBACK_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    Last7,
    LastMonth,
    Ytd,
}

impl FromStr for Preset {
    type Err = RangeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "last7" => Ok(Self::Last7),
            "lastMonth" => Ok(Self::LastMonth),
            "ytd" => Ok(Self::Ytd),
            other => Err(RangeError::UnknownPreset(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum DateSelection {
    Single { date: NaiveDate },
    Range { start: NaiveDate, end: NaiveDate },
    Preset { preset: Preset },
}

impl Default for DateSelection {
    fn default() -> Self {
        Self::Preset {
            preset: Preset::Last7,
        }
    }
}

impl DateSelection {
    pub fn from_query(query: &SelectionQuery) -> Result<Self, RangeError> {
        let mode = query.mode.as_deref().unwrap_or("preset");
        match mode {
            "single" => Ok(Self::Single {
                date: parse_date(required(&query.date, "date")?)?,
            }),
            "range" => Ok(Self::Range {
                start: parse_date(required(&query.start, "start")?)?,
                end: parse_date(required(&query.end, "end")?)?,
            }),
            "preset" => Ok(Self::Preset {
                preset: query.preset.as_deref().unwrap_or("last7").parse()?,
            }),
            other => Err(RangeError::UnknownMode(other.to_string())),
        }
    }

    pub fn resolve_at(&self, today: NaiveDate) -> Result<DateRange, RangeError> {
        let (start, end) = match *self {
            Self::Single { date } => (date, date),
            Self::Range { start, end } => (start, end),
            Self::Preset { preset } => match preset {
                Preset::Last7 => (today - Duration::days(6), today),
                Preset::LastMonth => {
                    let this_month = first_of_month(today);
                    let last_day = this_month - Duration::days(1);
                    (first_of_month(last_day), last_day)
                }
                Preset::Ytd => (
                    NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                    today,
                ),
            },
        };
        DateRange::new(start, end)
    }
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, RangeError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Compares the ISO form lexically, so a malformed date simply falls
    /// outside the range.
    pub fn contains(&self, date: &str) -> bool {
        let start = date_key(self.start);
        let end = date_key(self.end);
        date.len() == 10 && start.as_str() <= date && date <= end.as_str()
    }

    pub fn select(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|record| self.contains(&record.date))
            .cloned()
            .collect()
    }

    /// Calendar months the range touches, oldest first.
    pub fn months(&self) -> Vec<MonthKey> {
        let mut months = Vec::new();
        let mut cursor = Some(first_of_month(self.start));
        while let Some(month) = cursor.filter(|month| *month <= self.end) {
            months.push(MonthKey {
                year: month.year(),
                month: month.month(),
            });
            cursor = month.checked_add_months(Months::new(1));
        }
        months
    }
}

/// A calendar month, `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn contains(&self, date: &str) -> bool {
        date.len() == 10 && date.starts_with(&format!("{self}-"))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn parse_month(value: &str) -> Result<MonthKey, RangeError> {
    let value = value.trim();
    let first = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map_err(|_| RangeError::InvalidMonth(value.to_string()))?;
    Ok(MonthKey {
        year: first.year(),
        month: first.month(),
    })
}

pub fn parse_months(value: &str) -> Result<Vec<MonthKey>, RangeError> {
    let months = value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_month)
        .collect::<Result<Vec<_>, _>>()?;
    if months.is_empty() {
        return Err(RangeError::Missing("months"));
    }
    Ok(months)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| RangeError::InvalidDate(value.to_string()))
}

/// Most recent of the previous seven days that has any records.
pub fn latest_active_date(records: &[Record], today: NaiveDate) -> Option<NaiveDate> {
    (1..=LOOKBACK_DAYS)
        .map(|offset| today - Duration::days(offset))
        .find(|date| {
            let key = date_key(*date);
            records.iter().any(|record| record.date == key)
        })
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, RangeError> {
    value
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or(RangeError::Missing(name))
}
