//! Trip model and conversion from wire trips

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use transit_protocol::WireTrip;

use crate::config::{Abbreviations, RouteStyles, TimeDisplay};
use crate::traits::Color;

/// One scheduled vehicle visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub route_id: String,
    /// Empty when the server does not send stop ids
    pub stop_id: String,
    pub route_name: String,
    pub route_color: Color,
    pub headsign: String,
    /// Epoch seconds
    pub arrival_time: i64,
    /// Epoch seconds
    pub departure_time: i64,
    /// Backed by live vehicle tracking rather than the static timetable
    pub is_realtime: bool,
}

impl Trip {
    /// Row grouping key
    pub fn key(&self) -> (&str, &str) {
        (&self.route_id, &self.stop_id)
    }

    /// The time shown for this trip
    pub fn display_time(&self, mode: TimeDisplay) -> i64 {
        match mode {
            TimeDisplay::Departure => self.departure_time,
            TimeDisplay::Arrival => self.arrival_time,
        }
    }
}

/// Conversion errors
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TripError {
    /// `routeColor` present but not a hex RGB value
    InvalidRouteColor,
}

impl fmt::Display for TripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripError::InvalidRouteColor => f.write_str("invalid route color"),
        }
    }
}

/// Replace the first occurrence of every table entry, in table order
pub fn apply_abbreviations(headsign: &str, abbreviations: &Abbreviations) -> String {
    let mut headsign = String::from(headsign);
    for (from, to) in abbreviations {
        if from.is_empty() {
            continue;
        }
        if let Some(pos) = headsign.find(from.as_str()) {
            trace!("Applying abbreviation '{}' -> '{}'", from.as_str(), to.as_str());
            headsign.replace_range(pos..pos + from.len(), to);
        }
    }
    headsign
}

/// Applies configured styles and abbreviations to incoming trips
#[derive(Debug, Clone, Default)]
pub struct TripDecoder {
    styles: RouteStyles,
    abbreviations: Abbreviations,
    default_color: Color,
}

impl TripDecoder {
    pub fn new(styles: RouteStyles, abbreviations: Abbreviations, default_color: Color) -> Self {
        Self {
            styles,
            abbreviations,
            default_color,
        }
    }

    /// Convert one trip
    ///
    /// A configured route style wins over the server's name and color;
    /// otherwise the server color is used when present, else the default.
    pub fn decode(&self, wire: WireTrip) -> Result<Trip, TripError> {
        let headsign = apply_abbreviations(&wire.headsign, &self.abbreviations);
        let stop_id = wire.stop_id.unwrap_or_default();

        let (route_name, route_color) = match self.styles.get(&wire.route_id) {
            Some(style) => (style.name.clone(), style.color),
            None => {
                let color = match wire.route_color.as_deref() {
                    Some(hex) => Color::from_hex(hex).ok_or(TripError::InvalidRouteColor)?,
                    None => self.default_color,
                };
                (wire.route_name, color)
            }
        };

        Ok(Trip {
            route_id: wire.route_id,
            stop_id,
            route_name,
            route_color,
            headsign,
            arrival_time: wire.arrival_time,
            departure_time: wire.departure_time,
            is_realtime: wire.is_realtime,
        })
    }

    /// Convert a whole schedule; any invalid trip rejects all of them
    pub fn decode_all(&self, wires: Vec<WireTrip>) -> Result<Vec<Trip>, TripError> {
        wires.into_iter().map(|wire| self.decode(wire)).collect()
    }
}
