//! Jalali (Solar Hijri) calendar support.
//!
//! # Architecture
//!
//! - `jalali`: Gregorian <-> Jalali conversion and the `JalaliDate` value type
//! - `strftime`: `JalaliDateTime` and the `strftime`-style `DateFormatter`

mod jalali;
mod strftime;

use thiserror::Error;

pub use jalali::{
    days_in_month, gregorian_to_jalali, is_jalali_leap_year, jalali_to_gregorian, JalaliDate,
    MAX_YEAR, MIN_YEAR,
};
pub use strftime::{weekday_from_saturday, CalendarLocale, DateFormatter, JalaliDateTime};

/// Errors raised by calendar conversions and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid Jalali date {year:04}-{month:02}-{day:02}")]
    InvalidJalaliDate { year: i32, month: u32, day: u32 },

    #[error("invalid or unsupported Gregorian date {year:04}-{month:02}-{day:02}")]
    InvalidGregorianDate { year: i32, month: u32, day: u32 },

    #[error("cannot parse '{0}' as a date (expected YYYY-MM-DD or YYYY/MM/DD)")]
    Parse(String),
}
