//! Date and time normalization
//!
//! Entry dates come back from the spreadsheet in more than one shape
//! (`YYYY-MM-DD` from the form, `M/D/YYYY` from sheet edits, ISO timestamps
//! from date-typed cells). Parsing yields a tagged result so that the
//! "show the raw text when it can't be read" branch is explicit.

use chrono::{DateTime, Local, Months, NaiveDate, NaiveDateTime, TimeDelta};

/// Result of reading a stored date string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedDate {
    Parsed(NaiveDate),
    Unparsed(String),
}

impl ParsedDate {
    /// Render as `DD/MM/YYYY`, or the original text if it could not be read
    pub fn display(&self) -> String {
        match self {
            ParsedDate::Parsed(date) => date.format("%d/%m/%Y").to_string(),
            ParsedDate::Unparsed(raw) => raw.clone(),
        }
    }
}

/// Result of reading a stored `HH:MM` time string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTime {
    /// Hour in 0..=23 and the minute text exactly as stored
    Parsed { hour: u32, minutes: String },
    Unparsed(String),
}

impl ParsedTime {
    /// Render as 12-hour `H:MM AM|PM`, or the original text
    pub fn display(&self) -> String {
        match self {
            ParsedTime::Parsed { hour, minutes } => {
                let suffix = if *hour >= 12 { "PM" } else { "AM" };
                let hour = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                format!("{}:{} {}", hour, minutes, suffix)
            }
            ParsedTime::Unparsed(raw) => raw.clone(),
        }
    }
}

/// Parse a stored entry date
pub fn parse_date(input: &str) -> ParsedDate {
    let parsed = if input.contains('/') {
        parse_month_day_year(input)
    } else {
        parse_iso(input)
    };

    match parsed {
        Some(date) => ParsedDate::Parsed(date),
        None => ParsedDate::Unparsed(input.to_string()),
    }
}

/// Format a stored entry date as `DD/MM/YYYY`.
///
/// Unreadable input is returned unchanged.
pub fn format_date(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    parse_date(input).display()
}

/// Parse a stored `HH:MM` time
pub fn parse_time(input: &str) -> ParsedTime {
    let mut parts = input.split(':');
    let (Some(hour), Some(minutes)) = (parts.next(), parts.next()) else {
        return ParsedTime::Unparsed(input.to_string());
    };

    match hour.trim().parse::<u32>() {
        Ok(hour) if hour < 24 => ParsedTime::Parsed {
            hour,
            minutes: minutes.to_string(),
        },
        _ => ParsedTime::Unparsed(input.to_string()),
    }
}

/// Format a stored `HH:MM` time as 12-hour clock time.
///
/// Input without a `:` or with an unreadable hour is returned unchanged.
pub fn format_time(input: &str) -> String {
    parse_time(input).display()
}

/// `M/D/YYYY`, built with calendar rollover (`2/30/2024` is 1 March).
/// Two-digit years land in the 1900s.
fn parse_month_day_year(input: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = input.split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let month: i64 = parts[0].trim().parse().ok()?;
    let day: i64 = parts[1].trim().parse().ok()?;
    let mut year: i64 = parts[2].trim().parse().ok()?;
    if (0..=99).contains(&year) {
        year += 1900;
    }

    let first_of_year = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)?;
    let month_offset = month.checked_sub(1)?;
    let first_of_month = if month_offset >= 0 {
        first_of_year.checked_add_months(Months::new(u32::try_from(month_offset).ok()?))?
    } else {
        first_of_year.checked_sub_months(Months::new(u32::try_from(-month_offset).ok()?))?
    };

    first_of_month.checked_add_signed(TimeDelta::try_days(day.checked_sub(1)?)?)
}

fn parse_iso(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(dt.date());
        }
    }

    // Timestamps with an offset are shown in the viewer's local calendar
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Default values for the submission form's date and time inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    pub time: String,
}

impl FormDefaults {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M").to_string(),
        }
    }
}

/// Long-form display date, e.g. `Tuesday, March 5, 2024`
pub fn long_date(now: NaiveDateTime) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}

/// Current local wall-clock time
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
