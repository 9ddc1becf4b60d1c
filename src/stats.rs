//! The four trip reports.
//!
//! Every function here is a pure function of a trip slice. "Most common" queries
//! share one tie-break: on equal counts the smallest key wins (lowest month
//! number, Monday-first weekday, lowest hour, lexicographically smallest station
//! name or route, earliest birth year).

use std::collections::BTreeMap;

use chrono::{Datelike, Month, Timelike, Weekday};
use serde::Serialize;

use crate::trip::Trip;

/// Most frequent key, smallest key on ties. `None` for an empty input.
pub fn most_common<K: Ord>(keys: impl IntoIterator<Item = K>) -> Option<K> {
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }

    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        // strict > keeps the earlier (smaller) key on ties
        if best.as_ref().is_none_or(|(_, top)| count > *top) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

/// Occurrences per key.
pub fn value_counts<K: Ord>(keys: impl IntoIterator<Item = K>) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    counts
}

/// Most frequent times of travel, taken from start timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeReport {
    pub most_common_month: Month,
    pub most_common_weekday: Weekday,
    pub most_common_start_hour: u32,
}

/// `None` when there are no trips.
pub fn time_stats(trips: &[Trip]) -> Option<TimeReport> {
    // counted as ordinals so ties resolve to the earlier month or weekday
    let month = most_common(trips.iter().map(|t| t.start().month()))?;
    let weekday = most_common(trips.iter().map(|t| t.start().weekday().num_days_from_monday()))?;
    let hour = most_common(trips.iter().map(|t| t.start().hour()))?;

    Some(TimeReport {
        most_common_month: Month::try_from(u8::try_from(month).ok()?).ok()?,
        // chrono numbers weekdays from Monday = 0 on this conversion
        most_common_weekday: Weekday::try_from(u8::try_from(weekday).ok()?).ok()?,
        most_common_start_hour: hour,
    })
}

/// A start/end station pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Route {
    pub start_station: String,
    pub end_station: String,
}

/// Most popular stations and route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationReport {
    pub most_common_start_station: String,
    pub most_common_end_station: String,
    pub most_common_route: Route,
}

/// `None` when there are no trips.
pub fn station_stats(trips: &[Trip]) -> Option<StationReport> {
    let start = most_common(trips.iter().map(Trip::start_station))?;
    let end = most_common(trips.iter().map(Trip::end_station))?;
    let (route_start, route_end) = most_common(trips.iter().map(Trip::route))?;

    Some(StationReport {
        most_common_start_station: start.to_string(),
        most_common_end_station: end.to_string(),
        most_common_route: Route {
            start_station: route_start.to_string(),
            end_station: route_end.to_string(),
        },
    })
}

/// Total and mean trip duration in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationReport {
    pub trip_count: usize,
    pub total_duration_seconds: i64,
    /// `None` when there are no trips.
    pub mean_duration_seconds: Option<f64>,
}

pub fn duration_stats(trips: &[Trip]) -> DurationReport {
    let total: i64 = trips.iter().map(Trip::duration_seconds).sum();
    let mean = if trips.is_empty() {
        None
    } else {
        Some(total as f64 / trips.len() as f64)
    };

    DurationReport {
        trip_count: trips.len(),
        total_duration_seconds: total,
        mean_duration_seconds: mean,
    }
}

/// Earliest, latest and most common known birth year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BirthYearSummary {
    pub earliest_year: u16,
    pub latest_year: u16,
    pub most_common_year: u16,
}

/// Rider breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReport {
    pub user_type_counts: BTreeMap<String, usize>,
    /// Riders with unknown gender are not counted.
    pub gender_counts: BTreeMap<String, usize>,
    /// `None` when no trip has a known birth year.
    pub birth_years: Option<BirthYearSummary>,
}

pub fn user_stats(trips: &[Trip]) -> UserReport {
    let user_type_counts = value_counts(trips.iter().map(|t| t.user_type().to_string()));
    let gender_counts = value_counts(trips.iter().filter_map(|t| t.gender()).map(str::to_string));

    let years = || trips.iter().filter_map(Trip::birth_year);
    let birth_years = match (years().min(), years().max(), most_common(years())) {
        (Some(earliest_year), Some(latest_year), Some(most_common_year)) => Some(BirthYearSummary {
            earliest_year,
            latest_year,
            most_common_year,
        }),
        _ => None,
    };

    UserReport {
        user_type_counts,
        gender_counts,
        birth_years,
    }
}
