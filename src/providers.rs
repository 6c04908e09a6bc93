use crate::aggregate::percent;
use crate::models::{ProviderVolume, Record, ShowRate};
use crate::range::MonthKey;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Distinct bookings per provider, ordered by provider name.
pub fn booked_by_provider(records: &[Record]) -> Vec<ProviderVolume> {
    let mut seen = HashSet::new();
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();

    for record in records.iter().filter(|record| record.is_booked()) {
        if seen.insert(record.booking_key()) {
            *counts.entry(record.provider_label()).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(provider_name, booked_count)| ProviderVolume {
            provider_name: provider_name.to_string(),
            booked_count,
        })
        .collect()
}

/// Share of distinct bookings in `months` that were kept. A booking counts as
/// kept when any of its records says so.
pub fn show_rate(records: &[Record], months: &[MonthKey]) -> ShowRate {
    let months: BTreeSet<&MonthKey> = months.iter().collect();
    let mut bookings: HashMap<_, bool> = HashMap::new();

    for record in records.iter().filter(|record| record.is_booked()) {
        if !months.iter().any(|month| month.contains(&record.date)) {
            continue;
        }
        *bookings.entry(record.booking_key()).or_default() |= record.kept == Some(true);
    }

    let total_booked = bookings.len() as u64;
    let total_kept = bookings.values().filter(|kept| **kept).count() as u64;

    ShowRate {
        months_covered: months.iter().map(|month| month.to_string()).collect(),
        total_booked,
        total_kept,
        show_rate_percent: percent(total_kept, total_booked),
    }
}
