//! Explicit date/location selections for the daily overview.

use crate::types::BookingRow;
use crate::util::cmp_dates;
use std::collections::BTreeSet;

/// Sentinel option meaning "no filtering".
pub const SELECT_ALL: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    /// An empty selection, or one containing `"ALL"`, selects everything.
    pub fn from_values<I, S>(values: I) -> Selection
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() || values.contains(SELECT_ALL) {
            Selection::All
        } else {
            Selection::Only(values)
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(values) => values.contains(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingFilter {
    pub dates: Selection,
    pub locations: Selection,
}

impl BookingFilter {
    pub fn new(dates: Selection, locations: Selection) -> Self {
        BookingFilter { dates, locations }
    }

    pub fn matches(&self, row: &BookingRow) -> bool {
        self.dates.contains(&row.date) && self.locations.contains(&row.location)
    }

    pub fn apply<'a>(&self, rows: &'a [BookingRow]) -> Vec<&'a BookingRow> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Distinct dates in day-first chronological order.
pub fn available_dates(rows: &[BookingRow]) -> Vec<String> {
    let mut dates: Vec<String> = rows
        .iter()
        .map(|r| r.date.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    dates.sort_by(|a, b| cmp_dates(a, b));
    dates
}

/// Distinct locations, alphabetical.
pub fn available_locations(rows: &[BookingRow]) -> Vec<String> {
    rows.iter()
        .map(|r| r.location.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
