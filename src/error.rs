//! Error type shared by loading, aggregation, grid building and export.

use chrono::NaiveDate;

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The combined "date - location" column lacks the separator.
    #[error("row {line}: expected \"<date> - <location>\" but found {value:?}")]
    MalformedRow { line: usize, value: String },

    #[error("Earliest date {} is not a Monday", .date.format("%A %d/%m/%Y"))]
    NonMondayStart { date: NaiveDate },

    #[error("could not parse date {0:?} (expected day-first, e.g. 01/05/2024)")]
    InvalidDate(String),

    #[error("No grass bookings to process")]
    NoGridBookings,

    #[error("share code {0:?} is not a valid code")]
    ShareCodeInvalid(String),

    /// The requested input could not be located.
    #[error("{0}")]
    Input(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("document error: {0}")]
    Document(String),
}
