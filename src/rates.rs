use crate::errors::RateError;
use chrono::NaiveDate;

pub const DEFAULT_RATES: &str = "2000-01-01=154,2025-07-01=175";

/// Per-booking revenue, tiered by effective date. Always holds at least one
/// entry, sorted ascending by effective date.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueRateTable {
    entries: Vec<(String, f64)>,
}

impl RevenueRateTable {
    pub fn new(mut entries: Vec<(String, f64)>) -> Result<Self, RateError> {
        if entries.is_empty() {
            return Err(RateError::Empty);
        }
        for (date, rate) in &mut entries {
            *date = date.trim().to_string();
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() || date.len() != 10 {
                return Err(RateError::InvalidDate(date.clone()));
            }
            if !rate.is_finite() || *rate < 0.0 {
                return Err(RateError::InvalidRate(rate.to_string()));
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(RateError::DuplicateDate(pair[0].0.clone()));
        }
        Ok(Self { entries })
    }

    /// Parses `date=rate` pairs separated by commas.
    pub fn parse(raw: &str) -> Result<Self, RateError> {
        let mut entries = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let (date, rate) = part
                .split_once('=')
                .ok_or_else(|| RateError::InvalidRate(part.to_string()))?;
            let rate = rate
                .trim()
                .parse::<f64>()
                .map_err(|_| RateError::InvalidRate(rate.trim().to_string()))?;
            entries.push((date.to_string(), rate));
        }
        Self::new(entries)
    }

    /// Rate in effect on `date`. Dates before the first entry fall back to the
    /// earliest configured rate.
    pub fn rate_for(&self, date: &str) -> f64 {
        self.entries
            .iter()
            .rev()
            .find(|(effective, _)| effective.as_str() <= date)
            .unwrap_or(&self.entries[0])
            .1
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }
}

impl Default for RevenueRateTable {
    fn default() -> Self {
        Self {
            entries: vec![
                ("2000-01-01".to_string(), 154.0),
                ("2025-07-01".to_string(), 175.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_switches_on_effective_date() {
        let table = RevenueRateTable::default();
        assert_eq!(table.rate_for("2025-06-30"), 154.0);
        assert_eq!(table.rate_for("2025-07-01"), 175.0);
        assert_eq!(table.rate_for("2026-01-15"), 175.0);
    }

    #[test]
    fn dates_before_first_entry_use_floor_rate() {
        let table = RevenueRateTable::parse("2024-01-01=100,2025-01-01=120").unwrap();
        assert_eq!(table.rate_for("2019-03-04"), 100.0);
        assert_eq!(table.rate_for(""), 100.0);
    }

    #[test]
    fn parse_sorts_entries() {
        let table = RevenueRateTable::parse("2025-07-01=175, 2000-01-01=154").unwrap();
        assert_eq!(table, RevenueRateTable::default());
        assert_eq!(RevenueRateTable::parse(DEFAULT_RATES).unwrap(), table);
    }

    #[test]
    fn rejects_bad_tables() {
        assert_eq!(RevenueRateTable::parse(""), Err(RateError::Empty));
        assert_eq!(
            RevenueRateTable::parse("07/01/2025=175"),
            Err(RateError::InvalidDate("07/01/2025".to_string()))
        );
        assert_eq!(
            RevenueRateTable::parse("2025-07-01=abc"),
            Err(RateError::InvalidRate("abc".to_string()))
        );
        assert_eq!(
            RevenueRateTable::parse("2025-07-01=1,2025-07-01=2"),
            Err(RateError::DuplicateDate("2025-07-01".to_string()))
        );
    }
}
