use crate::error::Result;
use crate::export::render_grid;
use crate::types::Table;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table as TextTable, Tabled};
use tracing::info;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_table_csv(path: &Path, table: &Table) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    info!("wrote {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    info!("wrote {}", path.display());
    Ok(())
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, bytes)?;
    info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

pub fn out_path(dir: &Path, file: &str) -> PathBuf {
    dir.join(file)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = TextTable::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
    if rows.len() > max_rows {
        println!("... {} more row(s)\n", rows.len() - max_rows);
    }
}

pub fn preview_grid(table: &Table) {
    if table.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_grid(table));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BookingRow;

    #[test]
    fn csv_has_canonical_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rows.csv");
        let rows = vec![BookingRow {
            date: "06/05/2024".into(),
            location: "South".into(),
            kind: "Match".into(),
            ..Default::default()
        }];
        write_csv(&path, &rows).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,location,sublocation,time,type,booker,details")
        );
        assert_eq!(lines.next(), Some("06/05/2024,South,,,Match,,"));
    }

    #[test]
    fn table_csv_includes_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let table = Table {
            headers: vec!["a".into(), "priority".into()],
            rows: vec![vec!["1".into(), "priority-blue".into()]],
        };
        write_table_csv(&path, &table).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "a,priority\n1,priority-blue\n"
        );
    }
}
