//! `strftime`-style formatting of Jalali dates.
//!
//! | Directive | Output |
//! |-----------|--------|
//! | `%Y` `%y` | year, two-digit year |
//! | `%m` `%d` `%e` | month, day, space-padded day |
//! | `%j` | day of year (001-366) |
//! | `%B` `%b` `%h` | month name, abbreviated month name |
//! | `%A` `%a` | weekday name, abbreviated weekday name |
//! | `%u` `%w` | weekday number, Saturday = 1 / Saturday = 0 |
//! | `%H` `%I` `%M` `%S` `%p` | time of day |
//! | `%D` `%F` `%T` | `%m/%d/%y`, `%Y-%m-%d`, `%H:%M:%S` |
//! | `%n` `%t` `%%` | newline, tab, percent sign |
//!
//! Unknown directives are copied to the output unchanged.

use super::{CalendarError, JalaliDate};
use chrono::{NaiveDateTime, NaiveTime, Timelike, Weekday};
use std::fmt::Write;

const MONTHS_LATIN: [&str; 12] = [
    "Farvardin",
    "Ordibehesht",
    "Khordad",
    "Tir",
    "Mordad",
    "Shahrivar",
    "Mehr",
    "Aban",
    "Azar",
    "Dey",
    "Bahman",
    "Esfand",
];

const MONTHS_PERSIAN: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

// Indexed from Saturday.
const WEEKDAYS_LATIN: [&str; 7] = [
    "Shanbeh",
    "Yekshanbeh",
    "Doshanbeh",
    "Seshanbeh",
    "Chaharshanbeh",
    "Panjshanbeh",
    "Jomeh",
];

const WEEKDAYS_PERSIAN: [&str; 7] = [
    "شنبه",
    "یکشنبه",
    "دوشنبه",
    "سه‌شنبه",
    "چهارشنبه",
    "پنجشنبه",
    "جمعه",
];

const WEEKDAYS_PERSIAN_SHORT: [&str; 7] = ["ش", "ی", "د", "س", "چ", "پ", "ج"];

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

/// Language of month and weekday names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarLocale {
    /// Latin transliteration (`Farvardin`, `Shanbeh`).
    #[default]
    Latin,
    /// Persian script (`فروردین`, `شنبه`).
    Persian,
}

impl CalendarLocale {
    fn month_name(self, month: u32) -> &'static str {
        let index = month.saturating_sub(1) as usize % 12;
        match self {
            CalendarLocale::Latin => MONTHS_LATIN[index],
            CalendarLocale::Persian => MONTHS_PERSIAN[index],
        }
    }

    fn month_abbreviation(self, month: u32) -> &'static str {
        match self {
            CalendarLocale::Latin => {
                let name = self.month_name(month);
                name.get(..3).unwrap_or(name)
            }
            CalendarLocale::Persian => self.month_name(month),
        }
    }

    fn weekday_name(self, index: usize) -> &'static str {
        match self {
            CalendarLocale::Latin => WEEKDAYS_LATIN[index],
            CalendarLocale::Persian => WEEKDAYS_PERSIAN[index],
        }
    }

    fn weekday_abbreviation(self, index: usize) -> &'static str {
        match self {
            CalendarLocale::Latin => {
                let name = WEEKDAYS_LATIN[index];
                name.get(..3).unwrap_or(name)
            }
            CalendarLocale::Persian => WEEKDAYS_PERSIAN_SHORT[index],
        }
    }

    fn meridiem(self, hour: u32) -> &'static str {
        match (self, hour < 12) {
            (CalendarLocale::Latin, true) => "AM",
            (CalendarLocale::Latin, false) => "PM",
            (CalendarLocale::Persian, true) => "ق.ظ",
            (CalendarLocale::Persian, false) => "ب.ظ",
        }
    }
}

/// Day of the week counted from Saturday (Saturday = 0, Friday = 6).
pub fn weekday_from_saturday(weekday: Weekday) -> u32 {
    (weekday.num_days_from_monday() + 2) % 7
}

/// A Jalali date with a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JalaliDateTime {
    date: JalaliDate,
    time: NaiveTime,
}

impl JalaliDateTime {
    pub fn new(date: JalaliDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    pub fn from_gregorian(datetime: NaiveDateTime) -> Result<Self, CalendarError> {
        Ok(Self {
            date: JalaliDate::from_gregorian(datetime.date())?,
            time: datetime.time(),
        })
    }

    pub fn to_gregorian(&self) -> NaiveDateTime {
        self.date.to_gregorian().and_time(self.time)
    }

    pub fn date(&self) -> JalaliDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Format with Latin names and digits.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use i18n_kit::calendar::JalaliDateTime;
    ///
    /// let gregorian = NaiveDate::from_ymd_opt(2013, 9, 13)
    ///     .unwrap()
    ///     .and_hms_opt(14, 5, 0)
    ///     .unwrap();
    /// let jalali = JalaliDateTime::from_gregorian(gregorian).unwrap();
    /// assert_eq!(jalali.format("%A %e %B %Y, %I:%M %p"), "Jomeh 22 Shahrivar 1392, 02:05 PM");
    /// ```
    pub fn format(&self, pattern: &str) -> String {
        DateFormatter::default().format(self, pattern)
    }
}

/// Configurable `strftime` formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormatter {
    locale: CalendarLocale,
    persian_digits: bool,
}

impl DateFormatter {
    pub fn new(locale: CalendarLocale) -> Self {
        Self {
            locale,
            persian_digits: false,
        }
    }

    /// Render numbers with Persian digits. Only applies to the Persian locale.
    pub fn with_persian_digits(mut self, enabled: bool) -> Self {
        self.persian_digits = enabled;
        self
    }

    pub fn format(&self, datetime: &JalaliDateTime, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() * 2);
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some(directive) => self.directive(&mut out, datetime, directive),
                None => out.push('%'),
            }
        }
        out
    }

    fn directive(&self, out: &mut String, datetime: &JalaliDateTime, directive: char) {
        let date = datetime.date;
        let time = datetime.time;
        let locale = self.locale;
        let weekday = weekday_from_saturday(date.weekday()) as usize;
        let hour12 = match time.hour() % 12 {
            0 => 12,
            h => h,
        };

        match directive {
            'Y' => self.number(out, format_args!("{}", date.year())),
            'y' => self.number(out, format_args!("{:02}", date.year().rem_euclid(100))),
            'm' => self.number(out, format_args!("{:02}", date.month())),
            'd' => self.number(out, format_args!("{:02}", date.day())),
            'e' => self.number(out, format_args!("{:>2}", date.day())),
            'j' => self.number(out, format_args!("{:03}", date.ordinal())),
            'B' => out.push_str(locale.month_name(date.month())),
            'b' | 'h' => out.push_str(locale.month_abbreviation(date.month())),
            'A' => out.push_str(locale.weekday_name(weekday)),
            'a' => out.push_str(locale.weekday_abbreviation(weekday)),
            'u' => self.number(out, format_args!("{}", weekday + 1)),
            'w' => self.number(out, format_args!("{}", weekday)),
            'H' => self.number(out, format_args!("{:02}", time.hour())),
            'I' => self.number(out, format_args!("{:02}", hour12)),
            'M' => self.number(out, format_args!("{:02}", time.minute())),
            'S' => self.number(out, format_args!("{:02}", time.second())),
            'p' => out.push_str(locale.meridiem(time.hour())),
            'D' => out.push_str(&self.format(datetime, "%m/%d/%y")),
            'F' => out.push_str(&self.format(datetime, "%Y-%m-%d")),
            'T' => out.push_str(&self.format(datetime, "%H:%M:%S")),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            '%' => out.push('%'),
            other => {
                out.push('%');
                out.push(other);
            }
        }
    }

    fn number(&self, out: &mut String, value: std::fmt::Arguments<'_>) {
        if self.persian_digits && self.locale == CalendarLocale::Persian {
            let text = value.to_string();
            out.extend(text.chars().map(|c| match c.to_digit(10) {
                Some(d) => PERSIAN_DIGITS[d as usize],
                None => c,
            }));
        } else {
            // writing to a String cannot fail
            let _ = out.write_fmt(value);
        }
    }
}
