//! Gregorian <-> Jalali conversion.
//!
//! Closed-form arithmetic over the 33-year Jalali leap cycle. Supported
//! Jalali years are `1..=9999` (Gregorian 622-03-21 onwards).

use super::CalendarError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Cumulative days before each Gregorian month in a common year.
const GREGORIAN_DAYS_BEFORE_MONTH: [i64; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Days in 33 Jalali years (8 of them leap).
const DAYS_PER_CYCLE: i64 = 12053;
const DAYS_PER_400_YEARS: i64 = 146097;
const DAYS_PER_100_YEARS: i64 = 36524;
const DAYS_PER_4_YEARS: i64 = 1461;

/// Convert a Gregorian date to `(year, month, day)` in the Jalali calendar.
///
/// ```
/// use i18n_kit::calendar::gregorian_to_jalali;
///
/// assert_eq!(gregorian_to_jalali(2013, 9, 13).unwrap(), (1392, 6, 22));
/// ```
pub fn gregorian_to_jalali(year: i32, month: u32, day: u32) -> Result<(i32, u32, u32), CalendarError> {
    let invalid = CalendarError::InvalidGregorianDate { year, month, day };
    if year < 1 || NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(invalid);
    }

    let converted = g2j(i64::from(year), i64::from(month), i64::from(day));
    if !(MIN_YEAR..=MAX_YEAR).contains(&converted.0) {
        return Err(invalid);
    }
    Ok(converted)
}

/// Convert a Jalali date to `(year, month, day)` in the Gregorian calendar.
///
/// ```
/// use i18n_kit::calendar::jalali_to_gregorian;
///
/// assert_eq!(jalali_to_gregorian(1392, 6, 22).unwrap(), (2013, 9, 13));
/// ```
pub fn jalali_to_gregorian(year: i32, month: u32, day: u32) -> Result<(i32, u32, u32), CalendarError> {
    validate(year, month, day)?;
    Ok(j2g(i64::from(year), i64::from(month), i64::from(day)))
}

/// Whether a Jalali year has 366 days.
pub fn is_jalali_leap_year(year: i32) -> bool {
    let year = i64::from(year);
    day_number(year + 1) - day_number(year) == 366
}

/// Number of days in a Jalali month, `None` for months outside `1..=12`.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    match month {
        1..=6 => Some(31),
        7..=11 => Some(30),
        12 if is_jalali_leap_year(year) => Some(30),
        12 => Some(29),
        _ => None,
    }
}

/// Days from the arithmetic epoch to the first day of Jalali `year`.
fn day_number(year: i64) -> i64 {
    let y = year + 1595;
    365 * y + (y / 33) * 8 + ((y % 33) + 3) / 4
}

fn validate(year: i32, month: u32, day: u32) -> Result<(), CalendarError> {
    let valid = (MIN_YEAR..=MAX_YEAR).contains(&year)
        && days_in_month(year, month).is_some_and(|days| (1..=days).contains(&day));
    if valid {
        Ok(())
    } else {
        Err(CalendarError::InvalidJalaliDate { year, month, day })
    }
}

// Callers guarantee positive years, so integer division truncates the same
// way floor division would.
fn g2j(gy: i64, gm: i64, gd: i64) -> (i32, u32, u32) {
    let gy2 = if gm > 2 { gy + 1 } else { gy };
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
        + gd
        + GREGORIAN_DAYS_BEFORE_MONTH[(gm - 1) as usize];

    let mut jy = -1595 + 33 * (days / DAYS_PER_CYCLE);
    days %= DAYS_PER_CYCLE;
    jy += 4 * (days / DAYS_PER_4_YEARS);
    days %= DAYS_PER_4_YEARS;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let (jm, jd) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };
    (jy as i32, jm as u32, jd as u32)
}

fn j2g(jy: i64, jm: i64, jd: i64) -> (i32, u32, u32) {
    let jy = jy + 1595;
    let month_days = if jm < 7 {
        (jm - 1) * 31
    } else {
        (jm - 7) * 30 + 186
    };
    let mut days = -355_668 + 365 * jy + (jy / 33) * 8 + ((jy % 33) + 3) / 4 + jd + month_days;

    let mut gy = 400 * (days / DAYS_PER_400_YEARS);
    days %= DAYS_PER_400_YEARS;
    if days > DAYS_PER_100_YEARS {
        days -= 1;
        gy += 100 * (days / DAYS_PER_100_YEARS);
        days %= DAYS_PER_100_YEARS;
        if days >= 365 {
            days += 1;
        }
    }
    gy += 4 * (days / DAYS_PER_4_YEARS);
    days %= DAYS_PER_4_YEARS;
    if days > 365 {
        gy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let leap = (gy % 4 == 0 && gy % 100 != 0) || gy % 400 == 0;
    let month_lengths = [31, if leap { 29 } else { 28 }, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut gd = days + 1;
    let mut gm = 1;
    for length in month_lengths {
        if gd <= length {
            break;
        }
        gd -= length;
        gm += 1;
    }
    (gy as i32, gm as u32, gd as u32)
}

/// A validated Jalali calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JalaliDate {
    year: i32,
    month: u32,
    day: u32,
    gregorian: NaiveDate,
}

impl JalaliDate {
    /// Build a date, rejecting months outside `1..=12` and days past the
    /// end of the month.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        let (gy, gm, gd) = jalali_to_gregorian(year, month, day)?;
        let gregorian = NaiveDate::from_ymd_opt(gy, gm, gd)
            .ok_or(CalendarError::InvalidJalaliDate { year, month, day })?;
        Ok(Self {
            year,
            month,
            day,
            gregorian,
        })
    }

    pub fn from_gregorian(date: NaiveDate) -> Result<Self, CalendarError> {
        let (year, month, day) = gregorian_to_jalali(date.year(), date.month(), date.day())?;
        Ok(Self {
            year,
            month,
            day,
            gregorian: date,
        })
    }

    pub fn to_gregorian(&self) -> NaiveDate {
        self.gregorian
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Day of the year, starting at 1 on 1 Farvardin.
    pub fn ordinal(&self) -> u32 {
        if self.month <= 6 {
            (self.month - 1) * 31 + self.day
        } else {
            186 + (self.month - 7) * 30 + self.day
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.gregorian.weekday()
    }

    pub fn is_leap_year(&self) -> bool {
        is_jalali_leap_year(self.year)
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for JalaliDate {
    type Err = CalendarError;

    /// Parse `YYYY-MM-DD` or `YYYY/MM/DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || CalendarError::Parse(s.to_string());
        let parts: Vec<&str> = s.trim().split(['-', '/']).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(parse_error());
        };

        let year = year.parse().map_err(|_| parse_error())?;
        let month = month.parse().map_err(|_| parse_error())?;
        let day = day.parse().map_err(|_| parse_error())?;
        JalaliDate::new(year, month, day)
    }
}

impl Serialize for JalaliDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
