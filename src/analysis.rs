//! Runs the four reports over one dataset.
//!
//! Reports are independent, so each one runs on Tokio's blocking pool inside its
//! own span. With span-close events enabled the subscriber logs how long every
//! report took.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info_span};

use crate::stats::{
    DurationReport, StationReport, TimeReport, UserReport, duration_stats, station_stats,
    time_stats, user_stats,
};
use crate::trip::Trip;

/// All four reports for one filtered dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub trip_count: usize,
    pub time: Option<TimeReport>,
    pub stations: Option<StationReport>,
    pub duration: DurationReport,
    pub users: UserReport,
}

impl AnalysisReport {
    /// Computes the reports one after another on the calling thread.
    pub fn compute(trips: &[Trip]) -> Self {
        AnalysisReport {
            trip_count: trips.len(),
            time: time_stats(trips),
            stations: station_stats(trips),
            duration: duration_stats(trips),
            users: user_stats(trips),
        }
    }
}

fn spawn_report<T, F>(
    name: &'static str,
    trips: &Arc<[Trip]>,
    report: F,
) -> tokio::task::JoinHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&[Trip]) -> T + Send + 'static,
{
    let trips = Arc::clone(trips);
    tokio::task::spawn_blocking(move || {
        let span = info_span!("report", report = name, trips = trips.len());
        span.in_scope(|| report(&trips))
    })
}

/// Computes the reports concurrently.
#[tracing::instrument(skip_all, fields(trips = trips.len()))]
pub async fn analyze(trips: Arc<[Trip]>) -> Result<AnalysisReport> {
    let (time, stations, duration, users) = tokio::try_join!(
        spawn_report("time", &trips, time_stats),
        spawn_report("stations", &trips, station_stats),
        spawn_report("duration", &trips, duration_stats),
        spawn_report("users", &trips, user_stats),
    )
    .context("report task failed")?;

    debug!(has_time = time.is_some(), "Reports complete");

    Ok(AnalysisReport {
        trip_count: trips.len(),
        time,
        stations,
        duration,
        users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 4, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample() -> Vec<Trip> {
        vec![
            Trip::new(at(3, 8), at(3, 9), "A", "B", "Subscriber")
                .unwrap()
                .with_gender(Some("Male"))
                .with_birth_year(Some(1975)),
            Trip::new(at(4, 8), at(4, 8), "B", "B", "Customer").unwrap(),
            Trip::new(at(5, 17), at(5, 18), "A", "C", "Subscriber").unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let trips = sample();
        let sequential = AnalysisReport::compute(&trips);
        let concurrent = analyze(Arc::from(trips)).await.unwrap();
        assert_eq!(concurrent, sequential);
        assert_eq!(concurrent.trip_count, 3);
        assert_eq!(concurrent.duration.total_duration_seconds, 7200);
    }

    #[tokio::test]
    async fn test_empty_dataset_reports_no_data() {
        let report = analyze(Arc::from(Vec::new())).await.unwrap();
        assert_eq!(report.trip_count, 0);
        assert!(report.time.is_none());
        assert!(report.stations.is_none());
        assert!(report.duration.mean_duration_seconds.is_none());
        assert!(report.users.birth_years.is_none());
    }
}
