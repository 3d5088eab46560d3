//! Route style and abbreviation tables
//!
//! Both tables are ordered maps, so lookups and iteration are by
//! ascending key. Abbreviations are applied in that order.
//!
//! Text form, one entry per line:
//! ```text
//! # abbreviations: from;to  (a lone "from" removes the text)
//! Transit Center;TC
//! Station
//! # route styles: route_id;name;RRGGBB
//! 100479;1 Line;28813F
//! ```

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::traits::Color;

/// Display override for one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStyle {
    pub name: String,
    pub color: Color,
}

/// Route id -> style
pub type RouteStyles = BTreeMap<String, RouteStyle>;

/// Literal headsign text -> replacement
pub type Abbreviations = BTreeMap<String, String>;

/// Non-blank, non-comment lines, untrimmed
///
/// Spaces are significant: `"Street ;St "` replaces the text with the
/// trailing space.
fn entries(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    })
}

/// Parse `from;to` lines into `table`
///
/// Invalid lines are skipped with a warning. Returns the number of
/// entries added.
pub fn parse_abbreviations(text: &str, table: &mut Abbreviations) -> usize {
    let mut added = 0;
    for line in entries(text) {
        let mut parts = line.split(';');
        let from = parts.next().unwrap_or("");
        let to = parts.next().unwrap_or("");
        if parts.next().is_some() || from.is_empty() {
            warn!("Invalid abbreviation line: {}", line);
            continue;
        }
        table.insert(from.to_string(), to.to_string());
        added += 1;
    }
    added
}

/// Parse `route_id;name;RRGGBB` lines into `table`
///
/// Invalid lines (wrong field count, bad color) are skipped with a
/// warning. Returns the number of entries added.
pub fn parse_route_styles(text: &str, table: &mut RouteStyles) -> usize {
    let mut added = 0;
    for line in entries(text) {
        let parts: Vec<&str> = line.split(';').collect();
        let [route_id, name, color] = parts.as_slice() else {
            warn!("Invalid route style line: {}", line);
            continue;
        };
        let Some(color) = Color::from_hex(color) else {
            warn!("Invalid route style color: {}", line);
            continue;
        };
        table.insert(
            route_id.to_string(),
            RouteStyle {
                name: name.to_string(),
                color,
            },
        );
        added += 1;
    }
    added
}
