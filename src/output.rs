//! Presentation of analysis reports.
//!
//! Supports the human-readable console layout, JSON, and debug logging.

use std::io::Write;

use anyhow::Result;
use tracing::debug;

use crate::analysis::AnalysisReport;
use crate::filter::{TripFilter, TripMonth};
use crate::stats::{DurationReport, StationReport, TimeReport, UserReport};
use crate::trip::City;

const RULE: &str = "----------------------------------------";
const NO_DATA: &str = "no data";

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &AnalysisReport) {
    debug!("{:#?}", report);
}

/// Writes a report as pretty-printed JSON.
pub fn write_json<W: Write>(mut out: W, report: &AnalysisReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

fn describe_filter(filter: &TripFilter) -> String {
    let month = filter.month.map_or("all months", TripMonth::name);
    let day = filter.weekday.map_or("all days", weekday_name);
    format!("{month}, {day}")
}

fn write_time<W: Write>(out: &mut W, time: Option<&TimeReport>) -> Result<()> {
    writeln!(out, "\nMost Frequent Times of Travel\n")?;
    match time {
        Some(t) => {
            writeln!(out, "Most common month: {}", t.most_common_month.name())?;
            writeln!(out, "Most common day of week: {}", weekday_name(t.most_common_weekday))?;
            writeln!(out, "Most common start hour: {:02}:00", t.most_common_start_hour)?;
        }
        None => writeln!(out, "Times of travel: {NO_DATA}")?,
    }
    Ok(())
}

fn write_stations<W: Write>(out: &mut W, stations: Option<&StationReport>) -> Result<()> {
    writeln!(out, "\nMost Popular Stations and Trip\n")?;
    match stations {
        Some(s) => {
            writeln!(out, "Most common start station: {}", s.most_common_start_station)?;
            writeln!(out, "Most common end station: {}", s.most_common_end_station)?;
            writeln!(
                out,
                "Most common trip: {} -> {}",
                s.most_common_route.start_station, s.most_common_route.end_station
            )?;
        }
        None => writeln!(out, "Stations: {NO_DATA}")?,
    }
    Ok(())
}

fn write_duration<W: Write>(out: &mut W, duration: &DurationReport) -> Result<()> {
    writeln!(out, "\nTrip Duration\n")?;
    writeln!(out, "Total travel time: {} seconds", duration.total_duration_seconds)?;
    match duration.mean_duration_seconds {
        Some(mean) => writeln!(out, "Mean travel time: {mean:.1} seconds")?,
        None => writeln!(out, "Mean travel time: {NO_DATA}")?,
    }
    Ok(())
}

fn write_users<W: Write>(out: &mut W, users: &UserReport) -> Result<()> {
    writeln!(out, "\nUser Stats\n")?;
    for (user_type, count) in &users.user_type_counts {
        writeln!(out, "User type {user_type}: {count}")?;
    }
    if users.gender_counts.is_empty() {
        writeln!(out, "Gender: {NO_DATA}")?;
    }
    for (gender, count) in &users.gender_counts {
        writeln!(out, "Gender {gender}: {count}")?;
    }
    match &users.birth_years {
        Some(b) => writeln!(
            out,
            "Year of birth: earliest {}, most recent {}, most common {}",
            b.earliest_year, b.latest_year, b.most_common_year
        )?,
        None => writeln!(out, "Year of birth: {NO_DATA}")?,
    }
    Ok(())
}

fn weekday_name(day: chrono::Weekday) -> &'static str {
    use chrono::Weekday::*;
    match day {
        Mon => "Monday",
        Tue => "Tuesday",
        Wed => "Wednesday",
        Thu => "Thursday",
        Fri => "Friday",
        Sat => "Saturday",
        Sun => "Sunday",
    }
}

/// Writes the console layout for one analysis run.
pub fn write_report<W: Write>(
    mut out: W,
    city: City,
    filter: &TripFilter,
    report: &AnalysisReport,
) -> Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "{city} ({}): {} trips",
        describe_filter(filter),
        report.trip_count
    )?;
    writeln!(out, "{RULE}")?;

    write_time(&mut out, report.time.as_ref())?;
    writeln!(out, "{RULE}")?;
    write_stations(&mut out, report.stations.as_ref())?;
    writeln!(out, "{RULE}")?;
    write_duration(&mut out, &report.duration)?;
    writeln!(out, "{RULE}")?;
    write_users(&mut out, &report.users)?;
    writeln!(out, "{RULE}")?;

    Ok(())
}
