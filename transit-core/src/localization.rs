//! "Time remaining" labels

use alloc::format;
use alloc::string::String;

use crate::config::{LocalizationConfig, UnitDisplay};

/// Formats the time until a departure as a short label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localization {
    unit_display: UnitDisplay,
    now: String,
    minutes_long: String,
    minutes_short: String,
    hours_short: String,
}

impl Default for Localization {
    fn default() -> Self {
        Self::new(UnitDisplay::default(), &LocalizationConfig::default())
    }
}

impl Localization {
    pub fn new(unit_display: UnitDisplay, strings: &LocalizationConfig) -> Self {
        Self {
            unit_display,
            now: strings.now.clone(),
            minutes_long: strings.minutes_long.clone(),
            minutes_short: strings.minutes_short.clone(),
            hours_short: strings.hours_short.clone(),
        }
    }

    pub fn unit_display(&self) -> UnitDisplay {
        self.unit_display
    }

    /// Label for `target` as seen at `now` (both epoch seconds)
    ///
    /// - under 30 s (including the past): the "now" string
    /// - under a minute: zero minutes
    /// - under an hour: whole minutes
    /// - otherwise hours and minutes
    pub fn fmt_duration_from_now(&self, target: i64, now: i64) -> String {
        let diff = target.saturating_sub(now);

        if diff < 30 {
            return self.now.clone();
        }

        let minutes = if diff < 60 { 0 } else { diff / 60 };
        if minutes < 60 {
            return match self.unit_display {
                UnitDisplay::Long => format!("{}{}", minutes, self.minutes_long),
                UnitDisplay::Short => format!("{}{}", minutes, self.minutes_short),
                UnitDisplay::None => format!("{}", minutes),
            };
        }

        let hours = minutes / 60;
        let minutes = minutes % 60;
        match self.unit_display {
            UnitDisplay::Long | UnitDisplay::Short => format!(
                "{}{}{}{}",
                hours, self.hours_short, minutes, self.minutes_short
            ),
            UnitDisplay::None => format!("{}:{:02}", hours, minutes),
        }
    }
}
