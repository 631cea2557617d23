//! Weekly grass grid: seven days from a Monday by display pitch.

use crate::config::LocationConfig;
use crate::error::{ReportError, Result};
use crate::grass::grass_subset;
use crate::types::{BookingRow, WeekGrid};
use crate::util::{compact_time_range, parse_date_safe};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashMap;
use tracing::{debug, info};

/// Build the week grid for the grass locations in `rows`.
///
/// The earliest grass date must be a Monday; anything else fails with
/// [`ReportError::NonMondayStart`]. Pitch rows follow `pitch_mappings`, then
/// the activity locations. Mapped cells stack `"{details}\n{start}-{end}"`
/// entries in [`grass_subset`] order; activity cells read
/// `"Activity starts {time}"`.
pub fn build_week_grid(rows: &[BookingRow], locations: &LocationConfig) -> Result<WeekGrid> {
    let subset = grass_subset(rows, locations);
    let dated: Vec<(NaiveDate, &BookingRow)> = subset
        .iter()
        .map(|r| {
            parse_date_safe(&r.date)
                .map(|d| (d, r))
                .ok_or_else(|| ReportError::InvalidDate(r.date.clone()))
        })
        .collect::<Result<_>>()?;

    let week_start = dated
        .iter()
        .map(|(d, _)| *d)
        .min()
        .ok_or(ReportError::NoGridBookings)?;
    if week_start.weekday() != Weekday::Mon {
        return Err(ReportError::NonMondayStart { date: week_start });
    }
    let days: Vec<NaiveDate> = (0..7).map(|i| week_start + Duration::days(i)).collect();

    let mut activity: HashMap<(&str, NaiveDate), &str> = HashMap::new();
    for (date, r) in dated.iter().filter(|(_, r)| locations.is_activity(&r.location)) {
        let start = r.start_time();
        activity
            .entry((r.location.as_str(), *date))
            .and_modify(|e| {
                if start < *e {
                    *e = start;
                }
            })
            .or_insert(start);
    }

    let mut pitches = Vec::new();
    let mut cells = Vec::new();
    for mapping in &locations.pitch_mappings {
        let row: Vec<String> = days
            .iter()
            .map(|day| {
                dated
                    .iter()
                    .filter(|(d, r)| {
                        d == day
                            && r.location == mapping.location
                            && r.sublocation == mapping.sublocation
                    })
                    .map(|(_, r)| format!("{}\n{}", r.details, compact_time_range(&r.time)))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect();
        pitches.push(mapping.display_name.clone());
        cells.push(row);
    }
    for location in &locations.activity_locations {
        let row: Vec<String> = days
            .iter()
            .map(|day| {
                activity
                    .get(&(location.as_str(), *day))
                    .map(|t| format!("Activity starts {t}"))
                    .unwrap_or_default()
            })
            .collect();
        pitches.push(location.clone());
        cells.push(row);
    }

    debug!("grid uses {} grass rows", dated.len());
    info!(
        "built week grid from {} ({} pitches)",
        week_start.format("%d/%m/%Y"),
        pitches.len()
    );
    Ok(WeekGrid {
        week_start,
        days,
        pitches,
        cells,
    })
}
