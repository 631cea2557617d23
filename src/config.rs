//! Location metadata and export settings.
//!
//! Every table the aggregation engine consults lives here so a facility
//! change is a config edit. [`Config::default`] carries the canonical tables;
//! a TOML file can override any section.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub locations: LocationConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub share: ShareConfig,
}

/// Maps one (location, sublocation) pair to a row of the weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchMapping {
    pub location: String,
    pub sublocation: String,
    pub display_name: String,
}

impl PitchMapping {
    pub fn new(location: &str, sublocation: &str, display_name: &str) -> Self {
        PitchMapping {
            location: location.to_string(),
            sublocation: sublocation.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Distinct sublocations that make a daily group read as "ALL".
    pub expected_sublocations: BTreeMap<String, usize>,
    /// Raw group sizes that make a grass group read as "ALL".
    pub grass_thresholds: BTreeMap<String, usize>,
    pub grass_locations: Vec<String>,
    /// Locations reported as "Activity starts" in the weekly grid.
    pub activity_locations: Vec<String>,
    pub pitch_mappings: Vec<PitchMapping>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        fn counts(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        }
        LocationConfig {
            expected_sublocations: counts(&[
                ("Fives", 6),
                ("3g-1", 2),
                ("3g-2", 2),
                ("Cameron Bank", 2),
                ("East (winter)", 4),
                ("South", 3),
                ("Muga", 3),
                ("Astro 1", 2),
                ("Astro 2", 2),
                ("Cricket Nets", 4),
                ("Track Lanes 1-4", 4),
            ]),
            grass_thresholds: counts(&[
                ("3g-1", 2),
                ("3g-2", 2),
                ("Cameron Bank", 2),
                ("South", 3),
            ]),
            grass_locations: [
                "East (summer)",
                "East (winter)",
                "Cameron Bank",
                "South",
                "3g-1",
                "3g-2",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            activity_locations: vec!["3g-1".to_string(), "3g-2".to_string()],
            pitch_mappings: vec![
                PitchMapping::new("East (winter)", "Pitch 1", "East 1"),
                PitchMapping::new("East (winter)", "Pitch 2", "East 2"),
                PitchMapping::new("East (winter)", "Pitch 3", "East 3"),
                PitchMapping::new("East (winter)", "Training", "East Training"),
                PitchMapping::new("East (summer)", "Pitch 1", "Cricket"),
                PitchMapping::new("South", "S 1", "South 1"),
                PitchMapping::new("South", "S 2", "South 2"),
                PitchMapping::new("South", "S 3", "South 3"),
                PitchMapping::new("Cameron Bank", "C B 1", "CB1"),
                PitchMapping::new("Cameron Bank", "C B 2", "CB2"),
            ],
        }
    }
}

impl LocationConfig {
    pub fn is_grass(&self, location: &str) -> bool {
        self.grass_locations.iter().any(|l| l == location)
    }

    pub fn is_activity(&self, location: &str) -> bool {
        self.activity_locations.iter().any(|l| l == location)
    }

    /// Activity locations that are not grass locations. Their bookings never
    /// reach the grass views, so their grid rows stay empty.
    pub fn unreachable_activity_locations(&self) -> Vec<&str> {
        self.activity_locations
            .iter()
            .filter(|l| !self.is_grass(l))
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Spreadsheet column widths keyed by lower-case header.
    pub column_widths: BTreeMap<String, f64>,
    pub default_column_width: f64,
    /// Wrap width for the `details` column in PDF output.
    pub pdf_wrap_width: usize,
    pub out_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            column_widths: [
                ("location", 7.0),
                ("sublocation", 7.0),
                ("time", 10.0),
                ("type", 12.0),
                ("booker", 16.0),
                ("details", 30.0),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
            default_column_width: 12.0,
            pdf_wrap_width: 50,
            out_dir: PathBuf::from("."),
        }
    }
}

impl ExportConfig {
    pub fn width_for(&self, header: &str) -> f64 {
        self.column_widths
            .get(&header.to_lowercase())
            .copied()
            .unwrap_or(self.default_column_width)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub dir: PathBuf,
}

impl Default for ShareConfig {
    fn default() -> Self {
        ShareConfig {
            dir: PathBuf::from("shared_csvs"),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text)?;
        for location in config.locations.unreachable_activity_locations() {
            warn!("activity location {location:?} is not a grass location and will stay empty");
        }
        Ok(config)
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!("config {} not found, using defaults", path.display());
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)?;
        let config = Config::from_toml(&text)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }
}
