//! ISO 8601 week arithmetic.
//!
//! # Responsibility
//! - Convert between calendar dates and `(ISO year, ISO week)` pairs.
//! - Step across year boundaries using the true ISO week count of each year.
//! - Parse and format the canonical `YYYY-Www` text form.
//!
//! # Invariants
//! - A constructed `Week` always names a week that exists in its ISO year.
//! - Every day of a constructed `Week` is representable as a `NaiveDate`.
//! - Weeks start on Monday; week 1 contains the year's first Thursday.

use chrono::{Datelike, Local, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_WEEK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-[Ww](\d{1,2})$").expect("valid iso week regex"));
static BARE_WEEK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}$").expect("valid bare week regex"));

/// Errors from week parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekError {
    /// Text is neither a bare week number nor `YYYY-Www`.
    Malformed(String),
    /// Week number does not exist in the given ISO year, or the year lies
    /// outside the supported calendar.
    OutOfRange { year: i32, week: u32 },
    /// Stepping from a valid week would leave the supported calendar.
    CalendarLimit {
        year: i32,
        week: u32,
        direction: Direction,
    },
}

impl Display for WeekError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(text) => write!(
                f,
                "invalid week `{text}`; expected a week number or YYYY-Www"
            ),
            Self::OutOfRange { year, week } => match weeks_in_year(*year) {
                Some(last) => write!(f, "week {week} does not exist in {year} (valid: 1-{last})"),
                None => write!(f, "year {year} is outside the supported calendar"),
            },
            Self::CalendarLimit {
                year,
                week,
                direction,
            } => {
                let side = match direction {
                    Direction::Prev => "before",
                    Direction::Next => "after",
                };
                write!(f, "no week {side} {} in the supported calendar", format_week(*year, *week))
            }
        }
    }
}

impl Error for WeekError {}

/// Direction for [`adjacent_week`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// One ISO week, identified by ISO year and week number.
///
/// Monday and Sunday are resolved once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Week {
    year: i32,
    week: u32,
    #[serde(skip)]
    start: NaiveDate,
    #[serde(skip)]
    end: NaiveDate,
}

impl Week {
    /// Validates and builds a week.
    pub fn new(year: i32, week: u32) -> Result<Self, WeekError> {
        let out_of_range = WeekError::OutOfRange { year, week };
        // Checked first: chrono's ISO lookup steps into the neighbouring year.
        let last = weeks_in_year(year).ok_or_else(|| out_of_range.clone())?;
        if week == 0 || week > last {
            return Err(out_of_range);
        }
        match (
            NaiveDate::from_isoywd_opt(year, week, Weekday::Mon),
            NaiveDate::from_isoywd_opt(year, week, Weekday::Sun),
        ) {
            (Some(start), Some(end)) => Ok(Self {
                year,
                week,
                start,
                end,
            }),
            _ => Err(out_of_range),
        }
    }

    /// ISO week containing `date`.
    ///
    /// Fails only at the calendar edges, where part of the week is not a
    /// representable date.
    pub fn containing(date: NaiveDate) -> Result<Self, WeekError> {
        let iso = date.iso_week();
        Self::new(iso.year(), iso.week())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Monday of this week.
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Sunday of this week.
    pub fn end_date(&self) -> NaiveDate {
        self.end
    }

    pub fn prev(&self) -> Result<Self, WeekError> {
        self.step(Direction::Prev)
    }

    pub fn next(&self) -> Result<Self, WeekError> {
        self.step(Direction::Next)
    }

    fn step(&self, direction: Direction) -> Result<Self, WeekError> {
        let limit = || WeekError::CalendarLimit {
            year: self.year,
            week: self.week,
            direction,
        };
        let (year, week) = match direction {
            Direction::Prev if self.week == 1 => {
                let year = self.year.checked_sub(1).ok_or_else(limit)?;
                (year, weeks_in_year(year).ok_or_else(limit)?)
            }
            Direction::Prev => (self.year, self.week - 1),
            Direction::Next if Some(self.week) == weeks_in_year(self.year) => {
                (self.year.checked_add(1).ok_or_else(limit)?, 1)
            }
            Direction::Next => (self.year, self.week + 1),
        };
        Self::new(year, week).map_err(|_| limit())
    }
}

impl Display for Week {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Number of ISO weeks (52 or 53) in `year`, or `None` when chrono cannot
/// represent the year.
///
/// December 28th always falls in the last ISO week of its year.
pub fn weeks_in_year(year: i32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, 12, 28).map(|date| date.iso_week().week())
}

/// ISO week of today's local date.
pub fn current_week() -> Result<Week, WeekError> {
    Week::containing(Local::now().date_naive())
}

/// Inclusive Monday..Sunday date range of a week.
pub fn week_range(year: i32, week: u32) -> Result<(NaiveDate, NaiveDate), WeekError> {
    let week = Week::new(year, week)?;
    Ok((week.start_date(), week.end_date()))
}

/// Week before or after `(year, week)`, rolling across ISO year boundaries.
pub fn adjacent_week(year: i32, week: u32, direction: Direction) -> Result<Week, WeekError> {
    Week::new(year, week)?.step(direction)
}

/// Parses `45` (current ISO year) or `2025-W45`.
pub fn parse_week(text: &str) -> Result<Week, WeekError> {
    parse_week_with_default_year(text, current_week()?.year())
}

/// Parses like [`parse_week`], resolving bare week numbers against `default_year`.
pub fn parse_week_with_default_year(text: &str, default_year: i32) -> Result<Week, WeekError> {
    let trimmed = text.trim();

    if let Some(caps) = ISO_WEEK_RE.captures(trimmed) {
        let year = caps[1]
            .parse::<i32>()
            .map_err(|_| WeekError::Malformed(trimmed.to_string()))?;
        let week = caps[2]
            .parse::<u32>()
            .map_err(|_| WeekError::Malformed(trimmed.to_string()))?;
        return Week::new(year, week);
    }

    if BARE_WEEK_RE.is_match(trimmed) {
        let week = trimmed
            .parse::<u32>()
            .map_err(|_| WeekError::Malformed(trimmed.to_string()))?;
        return Week::new(default_year, week);
    }

    Err(WeekError::Malformed(trimmed.to_string()))
}

/// Canonical `YYYY-Www` text for a week pair.
pub fn format_week(year: i32, week: u32) -> String {
    format!("{year}-W{week:02}")
}
