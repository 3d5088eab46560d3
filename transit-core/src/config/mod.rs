//! Tracker configuration
//!
//! Static configuration loaded once at startup from TOML. See
//! `config/tracker.toml` for an annotated example.

pub mod tables;
pub mod types;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::Deserialize;

use crate::localization::Localization;
use crate::scroll::ScrollConfig;
use crate::traits::Color;

pub use tables::{parse_abbreviations, parse_route_styles, Abbreviations, RouteStyle, RouteStyles};
pub use types::*;

/// Route color used when neither a style nor the server provides one
pub const DEFAULT_ROUTE_COLOR: Color = Color(0x028E51);

/// Trips requested from the server by default
pub const DEFAULT_LIMIT: u32 = 10;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML syntax error or schema mismatch
    TomlParse,
    /// Base URL does not start with `ws://` or `wss://`
    InvalidBaseUrl,
    /// Result limit must be positive
    InvalidLimit,
    /// A hex color could not be parsed
    InvalidColor,
    /// Scroll speed and page size must be positive
    InvalidScroll,
    /// Row limit must be positive
    InvalidDisplay,
    /// Subscribe document could not be built
    Subscribe,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ConfigError::TomlParse => "invalid TOML configuration",
            ConfigError::InvalidBaseUrl => "URL must start with 'ws://' or 'wss://'",
            ConfigError::InvalidLimit => "limit must be positive",
            ConfigError::InvalidColor => "invalid hex color",
            ConfigError::InvalidScroll => "scroll speed and trips_per_page must be positive",
            ConfigError::InvalidDisplay => "row_limit must be positive",
            ConfigError::Subscribe => "failed to build subscribe message",
        };
        f.write_str(message)
    }
}

/// Complete tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Feed server URL; empty disables connecting
    pub base_url: String,
    /// Feed to query, empty for the server default
    pub feed_code: String,
    /// Maximum number of trips requested
    pub limit: u32,
    pub time_display: TimeDisplay,
    pub list_mode: ListMode,
    pub show_units: UnitDisplay,
    /// Hex RGB fallback route color
    pub default_route_color: Option<String>,
    pub stops: Vec<StopConfig>,
    pub styles: Vec<RouteStyleConfig>,
    pub abbreviations: Vec<AbbreviationConfig>,
    /// Route styles in `route_id;name;RRGGBB` text form
    pub styles_text: Option<String>,
    /// Abbreviations in `from;to` text form
    pub abbreviations_text: Option<String>,
    pub display: DisplayConfig,
    pub scroll: ScrollConfig,
    pub localization: LocalizationConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            feed_code: String::new(),
            limit: DEFAULT_LIMIT,
            time_display: TimeDisplay::default(),
            list_mode: ListMode::default(),
            show_units: UnitDisplay::default(),
            default_route_color: None,
            stops: Vec::new(),
            styles: Vec::new(),
            abbreviations: Vec::new(),
            styles_text: None,
            abbreviations_text: None,
            display: DisplayConfig::default(),
            scroll: ScrollConfig::default(),
            localization: LocalizationConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = toml::from_str(text).map_err(|_| ConfigError::TomlParse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and formats
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.is_empty()
            && !self.base_url.starts_with("ws://")
            && !self.base_url.starts_with("wss://")
        {
            return Err(ConfigError::InvalidBaseUrl);
        }
        if self.limit == 0 {
            return Err(ConfigError::InvalidLimit);
        }
        self.default_color()?;
        if self
            .styles
            .iter()
            .any(|style| Color::from_hex(&style.color).is_none())
        {
            return Err(ConfigError::InvalidColor);
        }
        if self.scroll.speed_px_per_s == 0 || self.scroll.trips_per_page == 0 {
            return Err(ConfigError::InvalidScroll);
        }
        if self.display.row_limit == 0 {
            return Err(ConfigError::InvalidDisplay);
        }
        Ok(())
    }

    /// Fallback route color
    pub fn default_color(&self) -> Result<Color, ConfigError> {
        match &self.default_route_color {
            Some(hex) => Color::from_hex(hex).ok_or(ConfigError::InvalidColor),
            None => Ok(DEFAULT_ROUTE_COLOR),
        }
    }

    /// Whether departure (rather than arrival) times are shown
    pub fn sort_by_departure(&self) -> bool {
        self.time_display == TimeDisplay::Departure
    }

    /// `route,stop,offset` selector for every configured route, joined by `;`
    pub fn route_stop_pairs(&self) -> String {
        let pairs: Vec<String> = self
            .stops
            .iter()
            .flat_map(|stop| {
                stop.routes
                    .iter()
                    .map(move |route| format!("{},{},{}", route, stop.stop_id, stop.time_offset_s))
            })
            .collect();
        pairs.join(";")
    }

    /// Route style table; text entries override structured ones
    pub fn route_styles(&self) -> RouteStyles {
        let mut table = RouteStyles::new();
        for style in &self.styles {
            if let Some(color) = Color::from_hex(&style.color) {
                table.insert(
                    style.route_id.clone(),
                    RouteStyle {
                        name: style.name.clone(),
                        color,
                    },
                );
            }
        }
        if let Some(text) = &self.styles_text {
            parse_route_styles(text, &mut table);
        }
        table
    }

    /// Abbreviation table; text entries override structured ones
    pub fn abbreviation_table(&self) -> Abbreviations {
        let mut table = Abbreviations::new();
        for abbreviation in self.abbreviations.iter().filter(|a| !a.from.is_empty()) {
            table.insert(abbreviation.from.clone(), abbreviation.to.clone());
        }
        if let Some(text) = &self.abbreviations_text {
            parse_abbreviations(text, &mut table);
        }
        table
    }

    /// Time label formatter for this configuration
    pub fn localization(&self) -> Localization {
        Localization::new(self.show_units, &self.localization)
    }
}
