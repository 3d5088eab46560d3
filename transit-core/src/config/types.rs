//! Configuration enums and sections

use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// Which trip time is shown and used for sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum TimeDisplay {
    #[default]
    Departure,
    Arrival,
}

/// Server-side list mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ListMode {
    /// All upcoming trips, in time order
    #[default]
    #[serde(rename = "sequential")]
    Sequential,
    /// Only the next trip of each route
    #[serde(rename = "nextPerRoute")]
    NextPerRoute,
}

impl ListMode {
    /// Wire name sent in the subscribe document
    pub fn as_str(self) -> &'static str {
        match self {
            ListMode::Sequential => "sequential",
            ListMode::NextPerRoute => "nextPerRoute",
        }
    }
}

/// Unit suffixes on time labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum UnitDisplay {
    /// `5min`
    #[default]
    Long,
    /// `5m`
    Short,
    /// `5`
    None,
}

/// How trips are grouped into rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Rows in feed order
    #[default]
    Sequential,
    /// Rows sorted by (route, stop); dual-time only
    Aggregated,
}

/// One configured stop and the routes watched there
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StopConfig {
    pub stop_id: String,
    /// Walking time to the stop; the server hides trips leaving sooner
    #[serde(default)]
    pub time_offset_s: i32,
    pub routes: Vec<String>,
}

/// Display name and color override for a route
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteStyleConfig {
    pub route_id: String,
    pub name: String,
    /// Hex RGB
    pub color: String,
}

/// Headsign substring replacement
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbbreviationConfig {
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Row composition settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    /// Show the next two times per row
    pub dual_time: bool,
    /// Maximum number of rows composed
    pub row_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Sequential,
            dual_time: false,
            row_limit: 10,
        }
    }
}

/// Label strings for time formatting
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    pub now: String,
    pub minutes_long: String,
    pub minutes_short: String,
    pub hours_short: String,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            now: String::from("Now"),
            minutes_long: String::from("min"),
            minutes_short: String::from("m"),
            hours_short: String::from("h"),
        }
    }
}
