//! Spreadsheet and document renderers.
//!
//! Renderers only see a [`Table`] or a [`WeekGrid`]; they never inspect how
//! the rows were produced.

use crate::config::ExportConfig;
use crate::error::{ReportError, Result};
use crate::types::{Table, WeekGrid};
use crate::util::{unique_sheet_names, wrap_text};
use chrono::Datelike;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::{ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::debug;

/// Column that is word-wrapped in document output.
pub const WRAP_COLUMN: &str = "details";

const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 10.0;
const LINE_HEIGHT_MM: f32 = 5.0;
const TITLE_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;

struct SheetFormats {
    header: Format,
    cell: Format,
}

fn sheet_formats() -> SheetFormats {
    let header = Format::new()
        .set_bold()
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_font_size(9);
    let cell = Format::new()
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Top)
        .set_font_size(9);
    SheetFormats { header, cell }
}

fn write_table(
    sheet: &mut Worksheet,
    table: &Table,
    settings: &ExportConfig,
    formats: &SheetFormats,
) -> Result<()> {
    for (col, header) in table.headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, header, &formats.header)?;
        sheet.set_column_width(col, settings.width_for(header))?;
    }
    for (row, cells) in table.rows.iter().enumerate() {
        let row = row as u32 + 1;
        for (col, value) in cells.iter().enumerate() {
            sheet.write_string_with_format(row, col as u16, value, &formats.cell)?;
        }
    }
    Ok(())
}

/// One-sheet workbook of `table`.
pub fn table_to_xlsx(table: &Table, settings: &ExportConfig) -> Result<Vec<u8>> {
    sheets_to_xlsx(&[("Sheet1".to_string(), table.clone())], settings)
}

/// One sheet per `(name, table)`; names are sanitised for the format and
/// suffixed where two of them would collide.
pub fn sheets_to_xlsx(sheets: &[(String, Table)], settings: &ExportConfig) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = sheet_formats();
    let names = unique_sheet_names(sheets.iter().map(|(name, _)| name.as_str()));
    for (name, (_, table)) in names.into_iter().zip(sheets) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_table(sheet, table, settings, &formats)?;
    }
    let buffer = workbook.save_to_buffer()?;
    debug!("spreadsheet with {} sheet(s), {} bytes", sheets.len(), buffer.len());
    Ok(buffer)
}

/// Week grid workbook: real dates across row 1, pitch names down column A.
pub fn week_grid_to_xlsx(grid: &WeekGrid) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let date_format = Format::new()
        .set_num_format("dddd\n dd/mm/yyyy")
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();
    let cell_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Grass week")?;
    sheet.set_column_width(0, 14)?;
    for (col, day) in grid.days.iter().enumerate() {
        let col = col as u16 + 1;
        let date = ExcelDateTime::from_ymd(day.year() as u16, day.month() as u8, day.day() as u8)?;
        sheet.write_datetime_with_format(0, col, &date, &date_format)?;
        sheet.set_column_width(col, 18)?;
    }
    for (row, (pitch, cells)) in grid.pitches.iter().zip(&grid.cells).enumerate() {
        let row = row as u32 + 1;
        sheet.write_string_with_format(row, 0, pitch, &cell_format)?;
        for (col, value) in cells.iter().enumerate() {
            sheet.write_string_with_format(row, col as u16 + 1, value, &cell_format)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}

/// Monospaced ASCII grid of `table`, with multi-line cells kept intact.
pub fn render_grid(table: &Table) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().cloned());
    for row in &table.rows {
        builder.push_record(row.iter().cloned());
    }
    builder.build().with(Style::ascii()).to_string()
}

/// Copy of `table` with `column` word-wrapped at `width`.
pub fn wrap_column(table: &Table, column: &str, width: usize) -> Table {
    let mut out = table.clone();
    if let Some(idx) = table.column_index(column) {
        for row in &mut out.rows {
            if let Some(cell) = row.get_mut(idx) {
                *cell = wrap_text(cell, width);
            }
        }
    }
    out
}

/// Landscape A4 PDF: `title` then the ASCII grid of `table` in Courier.
pub fn table_to_pdf(table: &Table, title: &str, settings: &ExportConfig) -> Result<Vec<u8>> {
    let body = render_grid(&wrap_column(table, WRAP_COLUMN, settings.pdf_wrap_width));
    let lines: Vec<&str> = body.lines().collect();

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| ReportError::Document(e.to_string()))?;

    let top = PAGE_HEIGHT_MM - MARGIN_MM;
    let title_lines = 2.0;
    let first_capacity = ((top - MARGIN_MM) / LINE_HEIGHT_MM - title_lines).max(1.0) as usize;
    let capacity = ((top - MARGIN_MM) / LINE_HEIGHT_MM).max(1.0) as usize;

    let layer = doc.get_page(first_page).get_layer(first_layer);
    layer.use_text(title, TITLE_SIZE, Mm(MARGIN_MM), Mm(top), &font);
    let mut y = top - LINE_HEIGHT_MM * title_lines;
    let (head, rest) = lines.split_at(first_capacity.min(lines.len()));
    for line in head {
        layer.use_text(*line, BODY_SIZE, Mm(MARGIN_MM), Mm(y), &font);
        y -= LINE_HEIGHT_MM;
    }

    let mut pages = 1;
    for chunk in rest.chunks(capacity) {
        let (page, layer_idx) =
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer_idx);
        let mut y = top;
        for line in chunk {
            layer.use_text(*line, BODY_SIZE, Mm(MARGIN_MM), Mm(y), &font);
            y -= LINE_HEIGHT_MM;
        }
        pages += 1;
    }
    debug!("document {title:?}: {} lines on {pages} page(s)", lines.len());

    doc.save_to_bytes()
        .map_err(|e| ReportError::Document(e.to_string()))
}
