//! CSV loader for city trip logs.
//!
//! Expected columns: `Start Time`, `End Time`, `Start Station`, `End Station`,
//! `User Type`, and optionally `Gender` and `Birth Year`. Other columns (the
//! leading index, `Trip Duration`) are ignored. Gzip input is detected by its
//! magic bytes and decompressed transparently.

use std::io::Read;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::CityConfig;
use crate::fetch::{HttpClient, read_source};
use crate::trip::{City, Trip};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];
const REQUIRED_COLUMNS: [&str; 5] = [
    "Start Time",
    "End Time",
    "Start Station",
    "End Station",
    "User Type",
];
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Category assigned to trips whose user type is blank.
pub const UNKNOWN_USER_TYPE: &str = "Unknown";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("failed to decompress gzip data: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A data row that was not turned into a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the CSV, header included.
    pub line: u64,
    pub reason: String,
}

/// Trips parsed from one CSV, plus the rows that were rejected.
#[derive(Debug, Default)]
pub struct ParsedTrips {
    pub trips: Vec<Trip>,
    pub skipped: Vec<SkippedRow>,
}

/// A city's dataset as loaded for one analysis run.
#[derive(Debug)]
pub struct LoadedDataset {
    pub city: City,
    pub source: String,
    pub trips: Vec<Trip>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Deserialize)]
struct TripRow {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    // written as 1992.0 in the published files
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<f64>,
}

fn parse_timestamp(field: &str, value: &str) -> Result<NaiveDateTime, String> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| format!("unparseable {field} '{value}'"))
}

fn parse_birth_year(value: Option<f64>) -> Result<Option<u16>, String> {
    match value {
        None => Ok(None),
        Some(y) if y == 0.0 => Ok(None),
        Some(y) if y.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&y) => {
            Ok(Some(y as u16))
        }
        Some(y) => Err(format!("invalid birth year '{y}'")),
    }
}

impl TripRow {
    fn into_trip(self) -> Result<Trip, String> {
        let start = parse_timestamp("start time", &self.start_time)?;
        let end = parse_timestamp("end time", &self.end_time)?;
        let birth_year = parse_birth_year(self.birth_year)?;

        let user_type = self
            .user_type
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| UNKNOWN_USER_TYPE.to_string());

        let trip = Trip::new(start, end, self.start_station, self.end_station, user_type)
            .map_err(|e| e.to_string())?
            .with_gender(self.gender.as_deref())
            .with_birth_year(birth_year);
        Ok(trip)
    }
}

fn decompress(bytes: &[u8]) -> Result<Vec<u8>, LoadError> {
    let mut out = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(LoadError::Gzip)?;
    Ok(out)
}

/// Parses a trip CSV. Rows with bad timestamps, an end before the start, or an
/// invalid birth year are skipped and reported in [`ParsedTrips::skipped`].
pub fn parse_trips(bytes: &[u8]) -> Result<ParsedTrips, LoadError> {
    let inflated;
    let data = if bytes.starts_with(&GZIP_MAGIC) {
        inflated = decompress(bytes)?;
        inflated.as_slice()
    } else {
        bytes
    };

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);
    let headers = rdr.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .into_iter()
        .find(|col| !headers.iter().any(|h| h == *col))
    {
        return Err(LoadError::MissingColumn(missing));
    }

    let mut parsed = ParsedTrips::default();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line());

        let trip = record
            .deserialize::<TripRow>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(TripRow::into_trip);

        match trip {
            Ok(trip) => parsed.trips.push(trip),
            Err(reason) => parsed.skipped.push(SkippedRow { line, reason }),
        }
    }

    Ok(parsed)
}

/// Resolves, reads and parses the dataset for `city`.
#[tracing::instrument(skip(client, config), fields(city = %city))]
pub async fn load_city<C: HttpClient>(
    client: &C,
    config: &CityConfig,
    city: City,
    data_dir: &str,
) -> Result<LoadedDataset> {
    let source = config.source_for(city, data_dir);
    let bytes = read_source(client, &source).await?;
    let parsed = parse_trips(&bytes).with_context(|| format!("parsing {source}"))?;

    for skip in parsed.skipped.iter().take(10) {
        warn!(line = skip.line, reason = %skip.reason, "Skipped trip row");
    }
    info!(
        source = %source,
        trips = parsed.trips.len(),
        skipped = parsed.skipped.len(),
        "Dataset loaded"
    );

    Ok(LoadedDataset {
        city,
        source,
        trips: parsed.trips,
        skipped: parsed.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubClient;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const CHICAGO: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1423854,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
955915,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
9031,2017-01-04 08:27:49,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Customer,,
";

    const WASHINGTON: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1621326,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
482740,2017-03-11 10:40:00,2017-03-11 10:46:00,402.549,Yuma St & Tenley Circle NW,,
";

    #[test]
    fn test_parse_chicago_rows() {
        let parsed = parse_trips(CHICAGO.as_bytes()).unwrap();
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.trips.len(), 3);

        let first = &parsed.trips[0];
        assert_eq!(first.start_station(), "Wood St & Hubbard St");
        assert_eq!(first.duration_seconds(), 321);
        assert_eq!(first.gender(), Some("Male"));
        assert_eq!(first.birth_year(), Some(1992));

        let customer = &parsed.trips[2];
        assert_eq!(customer.gender(), None);
        assert_eq!(customer.birth_year(), None);
    }

    #[test]
    fn test_parse_without_demographic_columns() {
        let parsed = parse_trips(WASHINGTON.as_bytes()).unwrap();
        assert_eq!(parsed.trips.len(), 2);
        assert!(parsed.trips.iter().all(|t| t.gender().is_none()));
        assert!(parsed.trips.iter().all(|t| t.birth_year().is_none()));
        assert_eq!(parsed.trips[1].end_station(), "");
        assert_eq!(parsed.trips[1].user_type(), UNKNOWN_USER_TYPE);
    }

    #[test]
    fn test_bad_rows_are_skipped_with_line_numbers() {
        let csv = "\
Start Time,End Time,Start Station,End Station,User Type,Birth Year
2017-01-01 10:00:00,2017-01-01 09:00:00,A,B,Subscriber,
not a time,2017-01-01 09:00:00,A,B,Subscriber,
2017-01-01 10:00:00,2017-01-01 10:10:00,A,B,Subscriber,1980.5
2017-01-01 10:00:00,2017-01-01 10:10:00,A,B,Subscriber,1980
2017-01-01 10:00:00,2017-01-01 10:10:00
";
        let parsed = parse_trips(csv.as_bytes()).unwrap();
        assert_eq!(parsed.trips.len(), 1);

        let lines: Vec<u64> = parsed.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, [2, 3, 4, 6]);
        assert!(parsed.skipped[0].reason.contains("before it starts"));
        assert!(parsed.skipped[1].reason.contains("unparseable start time"));
        assert!(parsed.skipped[2].reason.contains("birth year"));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "Start Time,End Time,Start Station\n";
        assert!(matches!(
            parse_trips(csv.as_bytes()),
            Err(LoadError::MissingColumn("End Station"))
        ));
    }

    #[test]
    fn test_gzip_input() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(CHICAGO.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let parsed = parse_trips(&compressed).unwrap();
        assert_eq!(parsed.trips.len(), 3);
    }

    #[test]
    fn test_birth_year_zero_is_unknown() {
        assert_eq!(parse_birth_year(Some(0.0)), Ok(None));
        assert_eq!(parse_birth_year(Some(1969.0)), Ok(Some(1969)));
        assert!(parse_birth_year(Some(-4.0)).is_err());
    }

    #[tokio::test]
    async fn test_load_city_from_base_url() {
        let url = "https://data.example.org/bikes/chicago.csv";
        let client = StubClient::new().with_response(url, 200, CHICAGO);

        let dataset = load_city(
            &client,
            &CityConfig::default(),
            City::Chicago,
            "https://data.example.org/bikes/",
        )
        .await
        .unwrap();

        assert_eq!(dataset.source, url);
        assert_eq!(dataset.trips.len(), 3);
        assert!(dataset.skipped.is_empty());
        assert_eq!(client.requested(), [url]);
    }

    #[tokio::test]
    async fn test_load_city_remote_not_found() {
        let client = StubClient::new();
        let result = load_city(
            &client,
            &CityConfig::default(),
            City::Washington,
            "https://data.example.org/bikes",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(client.requested(), ["https://data.example.org/bikes/washington.csv"]);
    }
}
