//! Facility booking reports.
//!
//! A fixed-layout booking export is normalized into a seven-column table,
//! condensed into daily and grass views, laid out as a weekly pitch grid and
//! rendered to spreadsheets and documents.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod grass;
pub mod grid;
pub mod loader;
pub mod output;
pub mod reports;
pub mod share;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
pub use types::{BookingRow, GrassRow, Priority, Table, WeekGrid};
