use crate::error::{ReportError, Result};
use crate::types::BookingRow;
use crate::util::decode_latin1;
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// First column of the booking block in the raw export (1-indexed).
pub const FIRST_COLUMN: usize = 24;
/// Last column of the booking block in the raw export (1-indexed).
pub const LAST_COLUMN: usize = 30;
/// Separator inside the combined "date - location" column.
pub const DATE_LOCATION_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Rows narrower than the booking block; missing cells read as empty.
    pub short_rows: usize,
}

pub fn load_export(path: &Path) -> Result<(Vec<BookingRow>, LoadReport)> {
    let bytes = fs::read(path)?;
    info!("read {} bytes from {}", bytes.len(), path.display());
    parse_export_bytes(&bytes)
}

/// Parse a raw export as delivered by the booking system (Latin-1 text).
pub fn parse_export_bytes(bytes: &[u8]) -> Result<(Vec<BookingRow>, LoadReport)> {
    parse_export(&decode_latin1(bytes))
}

/// Header-less CSV in, normalized rows out, in input order. The first
/// malformed row aborts the load.
pub fn parse_export(text: &str) -> Result<(Vec<BookingRow>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut report = LoadReport::default();
    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        report.total_rows += 1;
        if record.len() < LAST_COLUMN {
            report.short_rows += 1;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(idx + 1);
        let block: Vec<&str> = (FIRST_COLUMN - 1..LAST_COLUMN)
            .map(|i| record.get(i).unwrap_or(""))
            .collect();
        rows.push(normalize_block(&block, line)?);
    }
    debug!(
        "normalized {} rows ({} short)",
        report.total_rows, report.short_rows
    );
    Ok((rows, report))
}

/// Reshape the seven-cell booking block into the canonical schema.
///
/// Block layout: `[date - location, _, time, sublocation, type, booker, details]`.
pub fn normalize_block(block: &[&str], line: usize) -> Result<BookingRow> {
    let cell = |i: usize| block.get(i).copied().unwrap_or("").to_string();
    let combined = block.first().copied().unwrap_or("");
    let (date, location) = combined
        .split_once(DATE_LOCATION_SEPARATOR)
        .ok_or_else(|| ReportError::MalformedRow {
            line,
            value: combined.to_string(),
        })?;
    Ok(BookingRow {
        date: date.to_string(),
        location: location.to_string(),
        sublocation: cell(3),
        time: cell(2),
        kind: cell(4),
        booker: cell(5),
        details: cell(6),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_line(block: [&str; 7]) -> String {
        let mut cells: Vec<String> = (1..FIRST_COLUMN).map(|i| format!("c{i}")).collect();
        cells.extend(block.iter().map(|c| c.to_string()));
        cells.join(",")
    }

    #[test]
    fn slices_splits_and_reorders_the_booking_block() {
        let text = raw_line([
            "01/05/2024 - South",
            "x",
            "14:00 to 15:00",
            "Pitch 1",
            "Match",
            "J.Smith",
            "Final",
        ]);
        let (rows, report) = parse_export(&text).unwrap();
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.short_rows, 0);
        assert_eq!(
            rows,
            vec![BookingRow {
                date: "01/05/2024".into(),
                location: "South".into(),
                sublocation: "Pitch 1".into(),
                time: "14:00 to 15:00".into(),
                kind: "Match".into(),
                booker: "J.Smith".into(),
                details: "Final".into(),
            }]
        );
    }

    #[test]
    fn keeps_row_order_and_count() {
        let text = [
            raw_line(["02/05/2024 - Fives", "", "10:00 to 11:00", "F1", "Hire", "B", ""]),
            raw_line(["01/05/2024 - Fives", "", "09:00 to 10:00", "F2", "Hire", "A", ""]),
        ]
        .join("\n");
        let (rows, _) = parse_export(&text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].booker, "B");
        assert_eq!(rows[1].booker, "A");
        assert_eq!(rows[1].details, "");
    }

    #[test]
    fn missing_separator_is_reported_with_its_line() {
        let text = [
            raw_line(["01/05/2024 - South", "", "t", "S 1", "k", "b", "d"]),
            raw_line(["01/05/2024 South", "", "t", "S 1", "k", "b", "d"]),
        ]
        .join("\n");
        match parse_export(&text) {
            Err(ReportError::MalformedRow { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "01/05/2024 South");
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let mut cells: Vec<String> = (1..FIRST_COLUMN).map(|i| format!("c{i}")).collect();
        cells.extend(["03/05/2024 - South", "", "18:00 to 19:00", "S 2"].map(String::from));
        let (rows, report) = parse_export(&cells.join(",")).unwrap();
        assert_eq!(report.short_rows, 1);
        assert_eq!(rows[0].sublocation, "S 2");
        assert_eq!(rows[0].kind, "");
        assert_eq!(rows[0].details, "");
    }

    #[test]
    fn location_keeps_later_separators() {
        let row = normalize_block(&["01/05/2024 - Track - Lane 1", "", "", "", "", "", ""], 1)
            .unwrap();
        assert_eq!(row.location, "Track - Lane 1");
    }

    #[test]
    fn latin1_bytes_decode() {
        let mut line =
            raw_line(["01/05/2024 - South", "", "t", "S 1", "k", "b", "caf?"]).into_bytes();
        let last = line.len() - 1;
        line[last] = 0xE9;
        let (rows, _) = parse_export_bytes(&line).unwrap();
        assert_eq!(rows[0].details, "caf\u{e9}");
    }

    #[test]
    fn load_export_reads_latin1_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let mut bytes = raw_line(["01/05/2024 - South", "", "t", "S 1", "k", "Ren?", "d"])
            .into_bytes();
        let pos = bytes.iter().position(|b| *b == b'?').unwrap();
        bytes[pos] = 0xE9;
        fs::write(&path, &bytes).unwrap();

        let (rows, report) = load_export(&path).unwrap();
        assert_eq!(report.total_rows, 1);
        assert_eq!(rows[0].booker, "Ren\u{e9}");
        assert!(load_export(&dir.path().join("missing.csv")).is_err());
    }
}
