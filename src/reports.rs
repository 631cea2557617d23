use crate::aggregate::{aggregate_bookings, split_by_date};
use crate::config::{ExportConfig, LocationConfig};
use crate::error::Result;
use crate::export::{sheets_to_xlsx, table_to_pdf, table_to_xlsx, week_grid_to_xlsx};
use crate::filter::BookingFilter;
use crate::grass::{activity_begins, condense, grass_subset};
use crate::types::{ActivityStart, BookingRow, GrassRow, Table, WeekGrid};

/// A rendered export ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DailyOverview {
    pub rows: Vec<BookingRow>,
}

impl DailyOverview {
    /// One sheet per date when several dates are present, otherwise a single
    /// sheet. The date column is dropped either way.
    pub fn spreadsheet(&self, settings: &ExportConfig) -> Result<Artifact> {
        let runs = split_by_date(&self.rows);
        let bytes = if runs.len() > 1 {
            let sheets: Vec<(String, Table)> = runs
                .into_iter()
                .map(|(date, rows)| (date, Table::from_bookings(&rows).without_column("date")))
                .collect();
            sheets_to_xlsx(&sheets, settings)?
        } else {
            table_to_xlsx(
                &Table::from_bookings(&self.rows).without_column("date"),
                settings,
            )?
        };
        Ok(Artifact {
            file_name: "daily_overview.xlsx".to_string(),
            bytes,
        })
    }

    /// One document per date when several dates are present.
    pub fn documents(&self, settings: &ExportConfig) -> Result<Vec<Artifact>> {
        let runs = split_by_date(&self.rows);
        if runs.len() <= 1 {
            let table = Table::from_bookings(&self.rows).without_column("date");
            return Ok(vec![Artifact {
                file_name: "daily_overview.pdf".to_string(),
                bytes: table_to_pdf(&table, "Daily Overview", settings)?,
            }]);
        }
        runs.into_iter()
            .map(|(date, rows)| {
                let table = Table::from_bookings(&rows).without_column("date");
                let title = format!("Daily Overview for {date}");
                Ok(Artifact {
                    file_name: format!("daily_overview_{}.pdf", file_stem(&date)),
                    bytes: table_to_pdf(&table, &title, settings)?,
                })
            })
            .collect()
    }
}

pub fn daily_overview(
    rows: &[BookingRow],
    filter: &BookingFilter,
    locations: &LocationConfig,
) -> DailyOverview {
    DailyOverview {
        rows: aggregate_bookings(rows, filter, &locations.expected_sublocations),
    }
}

#[derive(Debug, Clone)]
pub struct GrassSection {
    pub location: String,
    pub rows: Vec<GrassRow>,
}

#[derive(Debug, Clone, Default)]
pub struct GrassOverview {
    pub sections: Vec<GrassSection>,
    /// Grass locations with no bookings in the export.
    pub missing: Vec<String>,
    pub activity: Vec<(String, Vec<ActivityStart>)>,
}

impl GrassOverview {
    pub fn tagged_rows(&self) -> Vec<GrassRow> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter().cloned())
            .collect()
    }
}

/// Per grass location, in configured order: condensed (or passed through)
/// rows with priority tags, plus activity start times.
pub fn grass_overview(rows: &[BookingRow], locations: &LocationConfig) -> GrassOverview {
    let subset = grass_subset(rows, locations);
    let mut overview = GrassOverview::default();
    for location in &locations.grass_locations {
        let group: Vec<BookingRow> = subset
            .iter()
            .filter(|r| &r.location == location)
            .cloned()
            .collect();
        if group.is_empty() {
            overview.missing.push(location.clone());
            continue;
        }
        if locations.is_activity(location) {
            overview
                .activity
                .push((location.clone(), activity_begins(&group, location)));
        }
        overview.sections.push(GrassSection {
            location: location.clone(),
            rows: condense(&group, &locations.grass_thresholds),
        });
    }
    overview
}

pub fn week_grid_artifact(grid: &WeekGrid) -> Result<Artifact> {
    Ok(Artifact {
        file_name: format!("grass_week_{}.xlsx", grid.week_start.format("%Y%m%d")),
        bytes: week_grid_to_xlsx(grid)?,
    })
}

pub fn full_data_artifacts(rows: &[BookingRow], settings: &ExportConfig) -> Result<Vec<Artifact>> {
    let table = Table::from_bookings(rows);
    Ok(vec![
        Artifact {
            file_name: "full_processed_data.xlsx".to_string(),
            bytes: table_to_xlsx(&table, settings)?,
        },
        Artifact {
            file_name: "full_processed_data.pdf".to_string(),
            bytes: table_to_pdf(&table, "Full Processed Data", settings)?,
        },
    ])
}

fn file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    fn booking(date: &str, location: &str, sub: &str, kind: &str) -> BookingRow {
        BookingRow {
            date: date.into(),
            location: location.into(),
            sublocation: sub.into(),
            time: "10:00 to 11:00".into(),
            kind: kind.into(),
            booker: "Club".into(),
            details: String::new(),
        }
    }

    #[test]
    fn multi_date_overview_splits_documents() {
        let rows = vec![
            booking("06/05/2024", "South", "S 1", "Hire"),
            booking("07/05/2024", "South", "S 1", "Hire"),
        ];
        let overview = daily_overview(&rows, &BookingFilter::default(), &LocationConfig::default());
        let docs = overview.documents(&ExportConfig::default()).unwrap();
        let names: Vec<&str> = docs.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["daily_overview_06-05-2024.pdf", "daily_overview_07-05-2024.pdf"]
        );
        assert!(overview
            .spreadsheet(&ExportConfig::default())
            .unwrap()
            .bytes
            .starts_with(b"PK"));
    }

    #[test]
    fn single_date_overview_has_one_document() {
        let rows = vec![booking("06/05/2024", "South", "S 1", "Hire")];
        let overview = daily_overview(&rows, &BookingFilter::default(), &LocationConfig::default());
        let docs = overview.documents(&ExportConfig::default()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "daily_overview.pdf");
    }

    #[test]
    fn grass_overview_follows_configured_order() {
        let rows = vec![
            booking("06/05/2024", "South", "S 1", "Hire"),
            booking("06/05/2024", "South", "S 2", "Hire"),
            booking("06/05/2024", "South", "S 3", "Hire"),
            booking("06/05/2024", "3g-1", "Half 1", "Grounds-15"),
            booking("06/05/2024", "Fives", "F1", "Hire"),
        ];
        let overview = grass_overview(&rows, &LocationConfig::default());
        let names: Vec<&str> = overview
            .sections
            .iter()
            .map(|s| s.location.as_str())
            .collect();
        assert_eq!(names, vec!["South", "3g-1"]);
        assert_eq!(overview.sections[0].rows.len(), 1);
        assert_eq!(overview.sections[0].rows[0].row.sublocation, "ALL");
        assert_eq!(overview.sections[1].rows[0].priority, Priority::Blue);
        assert_eq!(
            overview.missing,
            vec!["East (summer)", "East (winter)", "Cameron Bank", "3g-2"]
        );
        assert_eq!(overview.activity.len(), 1);
        assert_eq!(overview.activity[0].1[0].begins, "10:00");
        assert_eq!(overview.tagged_rows().len(), 2);
    }

    #[test]
    fn full_data_exports_both_formats() {
        let rows = vec![booking("06/05/2024", "South", "S 1", "Hire")];
        let artifacts = full_data_artifacts(&rows, &ExportConfig::default()).unwrap();
        assert!(artifacts[0].bytes.starts_with(b"PK"));
        assert!(artifacts[1].bytes.starts_with(b"%PDF"));
    }
}
