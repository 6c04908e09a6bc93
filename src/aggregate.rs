//! Client-facing dashboard metrics computed from one batch of records.
//!
//! Every call recomputes the full result; nothing is carried between calls.

use crate::models::{AggregationResult, BreakdownRow, Record};
use crate::rates::RevenueRateTable;
use std::collections::{HashMap, HashSet};

pub fn aggregate(records: &[Record], rates: &RevenueRateTable) -> AggregationResult {
    let total_sent = records.len() as u64;

    let mut statuses = Tally::default();
    let mut languages = Tally::default();
    let mut mediums = Tally::default();
    let mut seen = HashSet::new();
    let mut total_booked = 0u64;
    let mut estimated_revenue = 0.0;

    for record in records {
        statuses.add(record.status_label());
        languages.add(record.language_label());
        mediums.add(record.medium_label());

        if record.is_booked() && seen.insert(record.booking_key()) {
            total_booked += 1;
            estimated_revenue += rates.rate_for(&record.date);
        }
    }

    AggregationResult {
        status_breakdown: statuses.into_rows(total_sent),
        total_sent,
        total_booked,
        percent_booked: percent(total_booked, total_sent),
        estimated_revenue,
        language_breakdown: languages.into_rows(total_sent),
        medium_breakdown: mediums.into_rows(total_sent),
    }
}

/// `part / whole * 100` rounded to one decimal, 0 for an empty whole.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

/// Counts per label, remembering the order labels were first seen.
#[derive(Default)]
struct Tally {
    index: HashMap<String, usize>,
    counts: Vec<(String, u64)>,
}

impl Tally {
    fn add(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(label.to_string(), self.counts.len());
                self.counts.push((label.to_string(), 1));
            }
        }
    }

    fn into_rows(self, total: u64) -> Vec<BreakdownRow> {
        self.counts
            .into_iter()
            .map(|(label, count)| BreakdownRow {
                percent: percent(count, total),
                label,
                count,
            })
            .collect()
    }
}
