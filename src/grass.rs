//! Grass-location views: the condensed per-location listing and the
//! "activity begins" summary for 3G-style pitches.

use crate::config::LocationConfig;
use crate::types::{ActivityStart, BookingRow, GrassRow, ALL_SUBLOCATIONS};
use crate::util::{cmp_dates, DateKey};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Rows at grass locations, sorted by (location, sublocation, date, time,
/// type, booker).
pub fn grass_subset(rows: &[BookingRow], locations: &LocationConfig) -> Vec<BookingRow> {
    let mut subset: Vec<BookingRow> = rows
        .iter()
        .filter(|r| locations.is_grass(&r.location))
        .cloned()
        .collect();
    subset.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.sublocation.cmp(&b.sublocation))
            .then_with(|| cmp_dates(&a.date, &b.date))
            .then_with(|| a.time.cmp(&b.time))
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.booker.cmp(&b.booker))
    });
    subset
}

/// Condense rows that differ only in sublocation.
///
/// Locations are handled in first-appearance order. A location with a
/// threshold is grouped by (date, time, type, booker, details); a group whose
/// row count equals the threshold reads `"ALL"`, otherwise the sorted
/// distinct sublocations are joined. Locations without a threshold pass
/// through unchanged. Every output row carries its priority tag.
pub fn condense(rows: &[BookingRow], thresholds: &BTreeMap<String, usize>) -> Vec<GrassRow> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_location: BTreeMap<&str, Vec<&BookingRow>> = BTreeMap::new();
    for r in rows {
        let bucket = by_location.entry(r.location.as_str()).or_default();
        if bucket.is_empty() {
            order.push(&r.location);
        }
        bucket.push(r);
    }

    let mut out = Vec::with_capacity(rows.len());
    for location in order {
        let group = &by_location[location];
        match thresholds.get(location) {
            Some(&threshold) => out.extend(condense_location(location, group, threshold)),
            None => out.extend(group.iter().map(|r| GrassRow::from((*r).clone()))),
        }
    }
    debug!("condensed {} grass rows into {}", rows.len(), out.len());
    out
}

fn condense_location(location: &str, rows: &[&BookingRow], threshold: usize) -> Vec<GrassRow> {
    type GroupKey<'a> = (DateKey, &'a str, &'a str, &'a str, &'a str, &'a str);

    let mut groups: BTreeMap<GroupKey, Vec<&str>> = BTreeMap::new();
    for r in rows {
        groups
            .entry((
                DateKey::of(&r.date),
                r.date.as_str(),
                r.time.as_str(),
                r.kind.as_str(),
                r.booker.as_str(),
                r.details.as_str(),
            ))
            .or_default()
            .push(r.sublocation.as_str());
    }

    groups
        .into_iter()
        .map(|((_, date, time, kind, booker, details), subs)| {
            let sublocation = if subs.len() == threshold {
                ALL_SUBLOCATIONS.to_string()
            } else {
                subs.into_iter()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            GrassRow::from(BookingRow {
                date: date.to_string(),
                location: location.to_string(),
                sublocation,
                time: time.to_string(),
                kind: kind.to_string(),
                booker: booker.to_string(),
                details: details.to_string(),
            })
        })
        .collect()
}

/// Earliest start time per date at `location`, in date order.
pub fn activity_begins(rows: &[BookingRow], location: &str) -> Vec<ActivityStart> {
    let mut earliest: BTreeMap<(DateKey, &str), &str> = BTreeMap::new();
    for r in rows.iter().filter(|r| r.location == location) {
        let start = r.start_time();
        earliest
            .entry((DateKey::of(&r.date), r.date.as_str()))
            .and_modify(|e| {
                if start < *e {
                    *e = start;
                }
            })
            .or_insert(start);
    }
    earliest
        .into_iter()
        .map(|((_, date), begins)| ActivityStart {
            date: date.to_string(),
            begins: begins.to_string(),
        })
        .collect()
}
