//! Long-form date labels for tickets and summaries.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unknown locale tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

/// Languages a ticket can be printed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// Italian (`it-IT`)
    #[default]
    ItIt,
    /// British English (`en-GB`)
    EnGb,
}

impl Locale {
    /// BCP 47 tag
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::ItIt => "it-IT",
            Self::EnGb => "en-GB",
        }
    }

    /// Weekday, two-digit day, month and year spelled out
    ///
    /// `it-IT` gives `sabato 13 settembre 2025`, `en-GB` gives
    /// `Saturday 13 September 2025`.
    #[must_use]
    pub fn long_date(self, date: NaiveDate) -> String {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .format_localized("%A %d %B %Y", self.chrono_locale())
            .to_string()
    }

    const fn chrono_locale(self) -> chrono::Locale {
        match self {
            Self::ItIt => chrono::Locale::it_IT,
            Self::EnGb => chrono::Locale::en_GB,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "it" | "it-it" => Ok(Self::ItIt),
            "en" | "en-gb" => Ok(Self::EnGb),
            other => Err(UnsupportedLocale(other.to_string())),
        }
    }
}
