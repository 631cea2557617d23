use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Column names of the normalized booking schema, in canonical order.
pub const BOOKING_COLUMNS: [&str; 7] = [
    "date",
    "location",
    "sublocation",
    "time",
    "type",
    "booker",
    "details",
];

/// Sublocation marker for a group that covers every sub-unit of its location.
pub const ALL_SUBLOCATIONS: &str = "ALL";

/// One reservation record in the normalized schema.
///
/// Aggregated output reuses this shape; only `sublocation` changes meaning
/// (a single value, `"ALL"`, or a comma-joined list).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Tabled)]
pub struct BookingRow {
    #[serde(rename = "date")]
    #[tabled(rename = "date")]
    pub date: String,
    #[serde(rename = "location")]
    #[tabled(rename = "location")]
    pub location: String,
    #[serde(rename = "sublocation")]
    #[tabled(rename = "sublocation")]
    pub sublocation: String,
    #[serde(rename = "time")]
    #[tabled(rename = "time")]
    pub time: String,
    #[serde(rename = "type")]
    #[tabled(rename = "type")]
    pub kind: String,
    #[serde(rename = "booker")]
    #[tabled(rename = "booker")]
    pub booker: String,
    #[serde(rename = "details")]
    #[tabled(rename = "details")]
    pub details: String,
}

impl BookingRow {
    /// Cell values in `BOOKING_COLUMNS` order.
    pub fn cells(&self) -> [&str; 7] {
        [
            self.date.as_str(),
            self.location.as_str(),
            self.sublocation.as_str(),
            self.time.as_str(),
            self.kind.as_str(),
            self.booker.as_str(),
            self.details.as_str(),
        ]
    }

    /// Start of the `"HH:MM to HH:MM"` interval, or the whole field when the
    /// separator is missing.
    pub fn start_time(&self) -> &str {
        self.time
            .split_once(" to ")
            .map(|(start, _)| start)
            .unwrap_or(&self.time)
    }

    pub fn priority(&self) -> Priority {
        Priority::classify(&self.kind)
    }
}

const GROUNDS_TYPE: &str = "Grounds-15";
const GAME_MARKER: &str = "(game)";

/// Highlight classification carried next to a row for rendering layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "priority-blue")]
    Blue,
    #[serde(rename = "priority-yellow")]
    Yellow,
}

impl Priority {
    /// `"Grounds-15"` (exact, ignoring a `"(game)"` marker) wins over a
    /// `"(game)"` substring.
    pub fn classify(kind: &str) -> Priority {
        if kind.replace(GAME_MARKER, "").trim() == GROUNDS_TYPE {
            Priority::Blue
        } else if kind.contains(GAME_MARKER) {
            Priority::Yellow
        } else {
            Priority::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::None => "none",
            Priority::Blue => "priority-blue",
            Priority::Yellow => "priority-yellow",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condensed grass row with its highlight tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct GrassRow {
    #[serde(flatten)]
    #[tabled(inline)]
    pub row: BookingRow,
    #[serde(rename = "priority")]
    #[tabled(rename = "priority")]
    pub priority: Priority,
}

impl From<BookingRow> for GrassRow {
    fn from(row: BookingRow) -> Self {
        let priority = row.priority();
        GrassRow { row, priority }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ActivityStart {
    #[serde(rename = "date")]
    #[tabled(rename = "date")]
    pub date: String,
    #[serde(rename = "activity begins")]
    #[tabled(rename = "activity begins")]
    pub begins: String,
}

/// Seven days starting Monday by a fixed list of display pitches.
///
/// `cells[pitch][day]`; empty cells are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekGrid {
    pub week_start: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub pitches: Vec<String>,
    pub cells: Vec<Vec<String>>,
}

impl WeekGrid {
    pub fn cell(&self, pitch: &str, day: usize) -> Option<&str> {
        let row = self.pitches.iter().position(|p| p == pitch)?;
        self.cells.get(row)?.get(day).map(String::as_str)
    }

    /// Plain table view: a `pitch` column followed by one column per day.
    pub fn to_table(&self) -> Table {
        let mut headers = vec!["pitch".to_string()];
        headers.extend(
            self.days
                .iter()
                .map(|d| d.format("%A %d/%m/%Y").to_string()),
        );
        let rows = self
            .pitches
            .iter()
            .zip(&self.cells)
            .map(|(pitch, cells)| {
                let mut row = vec![pitch.clone()];
                row.extend(cells.iter().cloned());
                row
            })
            .collect();
        Table { headers, rows }
    }
}

/// Format-independent table handed to the export adapters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_bookings(rows: &[BookingRow]) -> Self {
        Table {
            headers: BOOKING_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.cells().iter().map(|f| f.to_string()).collect())
                .collect(),
        }
    }

    pub fn from_grass(rows: &[GrassRow]) -> Self {
        let mut table = Table::from_bookings(
            &rows.iter().map(|g| g.row.clone()).collect::<Vec<_>>(),
        );
        table.headers.push("priority".to_string());
        for (out, g) in table.rows.iter_mut().zip(rows) {
            out.push(g.priority.to_string());
        }
        table
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn without_column(&self, name: &str) -> Table {
        let Some(idx) = self.column_index(name) else {
            return self.clone();
        };
        let strip = |cells: &Vec<String>| {
            cells
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, c)| c.clone())
                .collect::<Vec<_>>()
        };
        Table {
            headers: strip(&self.headers),
            rows: self.rows.iter().map(strip).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
