// Entry point and high-level CLI flow.
//
// Each subcommand loads the raw export (from a file or a share code),
// prints a preview of the report and writes its files to the output
// directory:
// - `daily` aggregates bookings per date and location,
// - `grass` condenses the grass locations and lists activity start times,
// - `week` lays the grass bookings out on the Monday-to-Sunday grid,
// - `full` exports the normalized table as is,
// - `share` / `fetch` store and retrieve exports by share code.
use booking_report::config::Config;
use booking_report::error::{ReportError, Result};
use booking_report::filter::{available_dates, available_locations, BookingFilter, Selection};
use booking_report::grid::build_week_grid;
use booking_report::loader::{load_export, parse_export_bytes};
use booking_report::output;
use booking_report::reports::{self, Artifact};
use booking_report::share::{FileShareStore, ShareStore};
use booking_report::types::Table;
use booking_report::util;
use booking_report::BookingRow;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "booking_report", version, about = "Caretaker booking reports")]
struct Cli {
    /// TOML file overriding location tables and export settings
    #[arg(short, long, default_value = "booking_report.toml")]
    config: PathBuf,

    /// Directory for generated files (overrides the config)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Raw booking export (CSV, no header row)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Load a previously shared export instead of a file
    #[arg(short, long)]
    share_code: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bookings per date and location with sublocations condensed
    Daily {
        #[command(flatten)]
        source: Source,
        /// Dates to include ("ALL" or none for every date)
        #[arg(short, long = "date")]
        dates: Vec<String>,
        /// Locations to include ("ALL" or none for every location)
        #[arg(short, long = "location")]
        locations: Vec<String>,
    },
    /// Grass locations condensed, tagged and with activity start times
    Grass {
        #[command(flatten)]
        source: Source,
    },
    /// Weekly grass grid starting on the earliest (Monday) date
    Week {
        #[command(flatten)]
        source: Source,
    },
    /// The full normalized table
    Full {
        #[command(flatten)]
        source: Source,
    },
    /// Store an export and print its share code
    Share {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Write a shared export back to a file
    Fetch {
        #[arg(short, long)]
        share_code: String,
        #[arg(short = 'O', long = "output")]
        dest: PathBuf,
    },
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Normalized rows from a file or the share store.
fn load_rows(source: &Source, store: &FileShareStore) -> Result<Vec<BookingRow>> {
    let (rows, report) = match (&source.input, &source.share_code) {
        (Some(path), _) => load_export(path)?,
        (None, Some(code)) => match store.get(code)? {
            Some(bytes) => {
                println!("CSV file loaded from share code.");
                parse_export_bytes(&bytes)?
            }
            None => {
                return Err(ReportError::Input(
                    "The shared CSV file was not found. It may have expired. \
                     Please ask for a new share code."
                        .to_string(),
                ))
            }
        },
        (None, None) => return Err(ReportError::Input("no input given".to_string())),
    };
    println!(
        "Processing export... ({} rows loaded)",
        util::format_int(report.total_rows)
    );
    if report.short_rows > 0 {
        println!(
            "Note: {} rows were narrower than the booking columns; missing cells read as empty.",
            util::format_int(report.short_rows)
        );
    }
    println!();
    Ok(rows)
}

fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<()> {
    for a in artifacts {
        let path = output::out_path(out_dir, &a.file_name);
        output::write_bytes(&path, &a.bytes)?;
        println!("(Exported to {})", path.display());
    }
    Ok(())
}

/// Handle `daily`: aggregate per date/location, preview, and export.
fn handle_daily(
    rows: &[BookingRow],
    dates: Vec<String>,
    locations: Vec<String>,
    config: &Config,
) -> Result<()> {
    let filter = BookingFilter::new(
        Selection::from_values(dates),
        Selection::from_values(locations),
    );
    println!("Dates available: {}", available_dates(rows).join(", "));
    println!("Locations available: {}\n", available_locations(rows).join(", "));

    let overview = reports::daily_overview(rows, &filter, &config.locations);
    if overview.rows.is_empty() {
        println!("No bookings found for the selected criteria.\n");
        return Ok(());
    }

    println!("Daily Overview\n");
    for (date, day_rows) in booking_report::aggregate::split_by_date(&overview.rows) {
        println!("Date: {date}\n");
        output::preview_grid(&Table::from_bookings(&day_rows).without_column("date"));
    }

    let mut artifacts = vec![overview.spreadsheet(&config.export)?];
    artifacts.extend(overview.documents(&config.export)?);
    write_artifacts(&config.export.out_dir, &artifacts)
}

/// Handle `grass`: condensed grass listing with priority tags.
fn handle_grass(rows: &[BookingRow], config: &Config) -> Result<()> {
    println!("Grass Weekly Overview\n");
    let overview = reports::grass_overview(rows, &config.locations);
    if overview.sections.is_empty() {
        println!("No bookings found for the Grass locations in this file.\n");
        return Ok(());
    }
    for location in &overview.missing {
        println!("No bookings for Location: {location}");
    }
    println!();
    for section in &overview.sections {
        println!("Location: {} Bookings\n", section.location);
        output::preview_table_rows(&section.rows, 20);
    }
    for (location, starts) in &overview.activity {
        println!("{location} Activity Begins\n");
        output::preview_table_rows(starts, 7);
    }

    let tagged = overview.tagged_rows();
    let path = output::out_path(&config.export.out_dir, "grass_overview.csv");
    output::write_table_csv(&path, &Table::from_grass(&tagged))?;
    println!("(Full table exported to {})", path.display());
    Ok(())
}

/// Handle `week`: build the Monday grid and export it.
fn handle_week(rows: &[BookingRow], config: &Config) -> Result<()> {
    let grid = build_week_grid(rows, &config.locations)?;
    println!(
        "Grass week starting {}\n",
        grid.week_start.format("%A %d/%m/%Y")
    );
    output::preview_grid(&grid.to_table());

    let artifact = reports::week_grid_artifact(&grid)?;
    write_artifacts(&config.export.out_dir, std::slice::from_ref(&artifact))?;
    let json = output::out_path(&config.export.out_dir, "grass_week.json");
    output::write_json(&json, &grid)?;
    println!("(Grid data exported to {})", json.display());
    Ok(())
}

/// Handle `full`: the normalized table in every format.
fn handle_full(rows: &[BookingRow], config: &Config) -> Result<()> {
    println!("Full Processed Data\n");
    output::preview_table_rows(rows, 10);
    let csv_path = output::out_path(&config.export.out_dir, "full_processed_data.csv");
    output::write_csv(&csv_path, rows)?;
    println!("(Full table exported to {})", csv_path.display());
    write_artifacts(
        &config.export.out_dir,
        &reports::full_data_artifacts(rows, &config.export)?,
    )
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(&cli.config)?;
    if let Some(dir) = cli.out_dir {
        config.export.out_dir = dir;
    }
    let store = FileShareStore::new(config.share.dir.clone());

    match cli.command {
        Command::Daily {
            source,
            dates,
            locations,
        } => {
            let rows = load_rows(&source, &store)?;
            handle_daily(&rows, dates, locations, &config)
        }
        Command::Grass { source } => handle_grass(&load_rows(&source, &store)?, &config),
        Command::Week { source } => handle_week(&load_rows(&source, &store)?, &config),
        Command::Full { source } => handle_full(&load_rows(&source, &store)?, &config),
        Command::Share { input } => {
            let bytes = fs::read(&input)?;
            // refuse to share something that would not load
            parse_export_bytes(&bytes)?;
            let code = store.put(&bytes)?;
            println!("CSV shared successfully!");
            println!("Share code: {code}");
            Ok(())
        }
        Command::Fetch { share_code, dest } => match store.get(&share_code)? {
            Some(bytes) => {
                output::write_bytes(&dest, &bytes)?;
                println!("Shared CSV written to {}", dest.display());
                Ok(())
            }
            None => {
                println!(
                    "The shared CSV file was not found. It may have expired. \
                     Please ask for a new share code."
                );
                Ok(())
            }
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    info!("starting booking_report");
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
