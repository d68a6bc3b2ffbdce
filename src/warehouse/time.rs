//! Signing-date parsing and calendar attributes

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

/// Accepted timestamp layouts, most specific first
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Canonical text form used as the time dimension natural key
const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Parse a Socrata floating timestamp or plain date
///
/// Accepts `2023-05-10T00:00:00.000`, `2023-05-10T00:00:00`,
/// `2023-05-10 00:00:00` and `2023-05-10`. A trailing `Z` is ignored.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let value = value.strip_suffix('Z').unwrap_or(value);

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse and re-render a timestamp in canonical form
///
/// Two spellings of the same instant normalize to the same string, which
/// is what the fact-to-time join compares.
pub fn normalize_timestamp(value: &str) -> Option<String> {
    parse_timestamp(value).map(|ts| ts.format(CANONICAL_FORMAT).to_string())
}

/// Calendar attributes of one signing date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAttributes {
    /// Full timestamp
    pub fecha_completa: NaiveDateTime,
    /// Year
    pub anio: i32,
    /// Month (1-12)
    pub mes: u32,
    /// Quarter (1-4)
    pub trimestre: u32,
    /// English weekday name
    pub dia_semana: &'static str,
}

impl TimeAttributes {
    /// Derive attributes from a timestamp
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        let month = ts.month();
        Self {
            fecha_completa: ts,
            anio: ts.year(),
            mes: month,
            trimestre: (month - 1) / 3 + 1,
            dia_semana: weekday_name(ts.weekday()),
        }
    }

    /// Canonical text of `fecha_completa`
    pub fn canonical(&self) -> String {
        self.fecha_completa.format(CANONICAL_FORMAT).to_string()
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
