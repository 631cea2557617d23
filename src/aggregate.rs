use crate::filter::BookingFilter;
use crate::types::{BookingRow, ALL_SUBLOCATIONS};
use crate::util::DateKey;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Collapse a group's sublocations into one display value.
///
/// One distinct value is shown as is; a count equal to `expected` becomes
/// `"ALL"`; anything else is the sorted, deduplicated, comma-joined list.
pub fn collapse_sublocations<'a, I>(sublocations: I, expected: Option<usize>) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = sublocations.into_iter().collect();
    if distinct.len() == 1 {
        return distinct.into_iter().next().unwrap_or_default().to_string();
    }
    if expected == Some(distinct.len()) {
        return ALL_SUBLOCATIONS.to_string();
    }
    distinct.into_iter().collect::<Vec<_>>().join(", ")
}

/// Condense bookings for the daily overview.
///
/// Rows passing `filter` are partitioned by date (day-first chronological),
/// then location (alphabetical), then grouped by (time, type, booker,
/// details). Each group yields one row whose sublocation is collapsed with
/// the location's entry in `expected`. Output order is (date, location,
/// group key).
pub fn aggregate_bookings(
    rows: &[BookingRow],
    filter: &BookingFilter,
    expected: &BTreeMap<String, usize>,
) -> Vec<BookingRow> {
    type GroupKey<'a> = (&'a str, &'a str, &'a str, &'a str);

    // Keyed by the raw date text as well so spellings of one day stay apart.
    let mut partitions: BTreeMap<(DateKey, &str, &str), BTreeMap<GroupKey, Vec<&str>>> =
        BTreeMap::new();
    for r in filter.apply(rows) {
        partitions
            .entry((DateKey::of(&r.date), r.date.as_str(), r.location.as_str()))
            .or_default()
            .entry((
                r.time.as_str(),
                r.kind.as_str(),
                r.booker.as_str(),
                r.details.as_str(),
            ))
            .or_default()
            .push(r.sublocation.as_str());
    }

    let mut out = Vec::new();
    for ((_, date, location), groups) in partitions {
        let expected_count = expected.get(location).copied();
        for ((time, kind, booker, details), subs) in groups {
            out.push(BookingRow {
                date: date.to_string(),
                location: location.to_string(),
                sublocation: collapse_sublocations(subs, expected_count),
                time: time.to_string(),
                kind: kind.to_string(),
                booker: booker.to_string(),
                details: details.to_string(),
            });
        }
    }
    debug!("aggregated {} rows into {}", rows.len(), out.len());
    out
}

/// Split an aggregated table into consecutive per-date runs, keeping order.
pub fn split_by_date(rows: &[BookingRow]) -> Vec<(String, Vec<BookingRow>)> {
    let mut out: Vec<(String, Vec<BookingRow>)> = Vec::new();
    for r in rows {
        match out.last_mut() {
            Some((date, bucket)) if *date == r.date => bucket.push(r.clone()),
            _ => out.push((r.date.clone(), vec![r.clone()])),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationConfig;
    use crate::filter::Selection;
    use crate::types::{Table, BOOKING_COLUMNS};
    use std::collections::HashSet;

    fn booking(date: &str, location: &str, sub: &str, time: &str, booker: &str) -> BookingRow {
        BookingRow {
            date: date.into(),
            location: location.into(),
            sublocation: sub.into(),
            time: time.into(),
            kind: "Hire".into(),
            booker: booker.into(),
            details: String::new(),
        }
    }

    fn expected() -> BTreeMap<String, usize> {
        LocationConfig::default().expected_sublocations
    }

    #[test]
    fn full_set_of_sublocations_collapses_to_all() {
        let rows = vec![
            booking("01/05/2024", "South", "S 1", "10:00 to 11:00", "A"),
            booking("01/05/2024", "South", "S 2", "10:00 to 11:00", "A"),
            booking("01/05/2024", "South", "S 3", "10:00 to 11:00", "A"),
        ];
        let out = aggregate_bookings(&rows, &BookingFilter::default(), &expected());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sublocation, "ALL");
    }

    #[test]
    fn partial_set_lists_sorted_distinct_values() {
        let rows = vec![
            booking("01/05/2024", "South", "S 3", "10:00 to 11:00", "A"),
            booking("01/05/2024", "South", "S 1", "10:00 to 11:00", "A"),
            booking("01/05/2024", "South", "S 1", "10:00 to 11:00", "A"),
        ];
        let out = aggregate_bookings(&rows, &BookingFilter::default(), &expected());
        assert_eq!(out[0].sublocation, "S 1, S 3");
    }

    #[test]
    fn single_sublocation_is_kept_even_with_duplicates() {
        assert_eq!(collapse_sublocations(["P1", "P1"], Some(1)), "P1");
        assert_eq!(collapse_sublocations(["P1"], Some(2)), "P1");
    }

    #[test]
    fn unknown_location_never_reads_all() {
        let rows = vec![
            booking("01/05/2024", "Sports Hall", "Court 1", "10:00 to 11:00", "A"),
            booking("01/05/2024", "Sports Hall", "Court 2", "10:00 to 11:00", "A"),
        ];
        let out = aggregate_bookings(&rows, &BookingFilter::default(), &expected());
        assert_eq!(out[0].sublocation, "Court 1, Court 2");
    }

    #[test]
    fn output_is_ordered_by_date_location_then_group() {
        let rows = vec![
            booking("02/06/2024", "Fives", "F1", "09:00 to 10:00", "A"),
            booking("10/05/2024", "South", "S 1", "12:00 to 13:00", "B"),
            booking("10/05/2024", "Fives", "F1", "18:00 to 19:00", "C"),
            booking("10/05/2024", "Fives", "F2", "08:00 to 09:00", "D"),
        ];
        let out = aggregate_bookings(&rows, &BookingFilter::default(), &expected());
        let order: Vec<&str> = out.iter().map(|r| r.booker.as_str()).collect();
        assert_eq!(order, vec!["D", "C", "B", "A"]);
    }

    #[test]
    fn groups_are_unique_and_never_grow() {
        let rows = vec![
            booking("01/05/2024", "3g-1", "Half 1", "10:00 to 11:00", "A"),
            booking("01/05/2024", "3g-1", "Half 2", "10:00 to 11:00", "A"),
            booking("01/05/2024", "3g-1", "Half 1", "11:00 to 12:00", "A"),
            booking("01/05/2024", "3g-1", "Half 1", "11:00 to 12:00", "B"),
            booking("01/05/2024", "3g-2", "Half 1", "11:00 to 12:00", "B"),
        ];
        let out = aggregate_bookings(&rows, &BookingFilter::default(), &expected());
        assert!(out.len() <= rows.len());
        let keys: HashSet<_> = out
            .iter()
            .map(|r| (&r.date, &r.location, &r.time, &r.kind, &r.booker, &r.details))
            .collect();
        assert_eq!(keys.len(), out.len());
        assert_eq!(out[0].sublocation, "ALL");
    }

    #[test]
    fn empty_details_still_form_a_group() {
        let mut with_details = booking("01/05/2024", "Fives", "F1", "10:00 to 11:00", "A");
        with_details.details = "Cup".into();
        let rows = vec![
            booking("01/05/2024", "Fives", "F1", "10:00 to 11:00", "A"),
            with_details,
        ];
        let out = aggregate_bookings(&rows, &BookingFilter::default(), &expected());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].details, "");
    }

    #[test]
    fn filter_limits_the_partitions() {
        let rows = vec![
            booking("01/05/2024", "South", "S 1", "10:00 to 11:00", "A"),
            booking("01/05/2024", "Fives", "F1", "10:00 to 11:00", "A"),
        ];
        let filter = BookingFilter::new(Selection::All, Selection::from_values(["Fives"]));
        let out = aggregate_bookings(&rows, &filter, &expected());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].location, "Fives");
    }

    #[test]
    fn empty_input_gives_empty_table_with_schema() {
        let out = aggregate_bookings(&[], &BookingFilter::default(), &expected());
        assert!(out.is_empty());
        let table = Table::from_bookings(&out);
        assert_eq!(table.headers, BOOKING_COLUMNS.to_vec());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn split_by_date_keeps_runs() {
        let rows = vec![
            booking("01/05/2024", "South", "S 1", "t", "A"),
            booking("01/05/2024", "Fives", "F1", "t", "B"),
            booking("02/05/2024", "South", "S 1", "t", "C"),
        ];
        let runs = split_by_date(&rows);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].0, "01/05/2024");
        assert_eq!(runs[0].1.len(), 2);
        assert_eq!(runs[1].1[0].booker, "C");
    }
}
