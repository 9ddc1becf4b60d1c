//! Month and weekday filtering of trip datasets.
//!
//! Months are numbered the calendar way (1 = January). Weekdays are compared as
//! [`chrono::Weekday`] values, so no index arithmetic is involved in matching.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Weekday};
use thiserror::Error;

use crate::trip::Trip;

/// Rejected filter input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid month '{0}' (expected all or january..june)")]
    InvalidMonth(String),

    #[error("invalid day '{0}' (expected all or monday..sunday)")]
    InvalidWeekday(String),
}

/// Months the datasets cover. The discriminant is the calendar month number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TripMonth {
    January = 1,
    February = 2,
    March = 3,
    April = 4,
    May = 5,
    June = 6,
}

impl TripMonth {
    pub const ALL: [TripMonth; 6] = [
        TripMonth::January,
        TripMonth::February,
        TripMonth::March,
        TripMonth::April,
        TripMonth::May,
        TripMonth::June,
    ];

    /// Calendar month number, 1 = January.
    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            TripMonth::January => "January",
            TripMonth::February => "February",
            TripMonth::March => "March",
            TripMonth::April => "April",
            TripMonth::May => "May",
            TripMonth::June => "June",
        }
    }
}

impl fmt::Display for TripMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TripMonth {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TripMonth::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FilterError::InvalidMonth(s.to_string()))
    }
}

/// Full English weekday names, Monday first.
const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

fn is_all(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("all")
}

/// `all` or a month name, case-insensitive.
pub fn parse_month_selector(s: &str) -> Result<Option<TripMonth>, FilterError> {
    if is_all(s) {
        return Ok(None);
    }
    s.parse().map(Some)
}

/// `all` or a full weekday name, case-insensitive.
pub fn parse_weekday_selector(s: &str) -> Result<Option<Weekday>, FilterError> {
    if is_all(s) {
        return Ok(None);
    }
    let wanted = s.trim();
    WEEKDAY_NAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, day)| Some(*day))
        .ok_or_else(|| FilterError::InvalidWeekday(s.to_string()))
}

/// A month and weekday constraint. `None` means no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TripFilter {
    pub month: Option<TripMonth>,
    pub weekday: Option<Weekday>,
}

impl TripFilter {
    pub fn new(month: Option<TripMonth>, weekday: Option<Weekday>) -> Self {
        TripFilter { month, weekday }
    }

    /// Validates raw user input. Each argument is `all` or a member name,
    /// case-insensitive.
    pub fn parse(month: &str, day: &str) -> Result<Self, FilterError> {
        Ok(TripFilter {
            month: parse_month_selector(month)?,
            weekday: parse_weekday_selector(day)?,
        })
    }

    /// True when the trip's start timestamp satisfies every active constraint.
    pub fn matches(&self, trip: &Trip) -> bool {
        let start = trip.start();
        self.month.is_none_or(|m| start.month() == m.number())
            && self.weekday.is_none_or(|w| start.weekday() == w)
    }

    /// Matching trips in their original order.
    pub fn apply(&self, trips: &[Trip]) -> Vec<Trip> {
        trips.iter().filter(|t| self.matches(t)).cloned().collect()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.month.is_none() && self.weekday.is_none()
    }
}

/// Narrows `trips` to those starting in `month` and on `weekday`.
///
/// Records from months outside January..June survive only when `month` is
/// `None`.
pub fn filter_trips(trips: &[Trip], month: Option<TripMonth>, weekday: Option<Weekday>) -> Vec<Trip> {
    TripFilter::new(month, weekday).apply(trips)
}
