//! Trip records and the cities they come from.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Reasons a trip cannot be constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TripError {
    #[error("trip ends at {end} before it starts at {start}")]
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// One bike rental.
///
/// The end timestamp is never earlier than the start timestamp; [`Trip::new`]
/// refuses such records. Unknown rider attributes are `None`, never a blank
/// string or a zero year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    start: NaiveDateTime,
    end: NaiveDateTime,
    start_station: String,
    end_station: String,
    user_type: String,
    gender: Option<String>,
    birth_year: Option<u16>,
}

impl Trip {
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        start_station: impl Into<String>,
        end_station: impl Into<String>,
        user_type: impl Into<String>,
    ) -> Result<Self, TripError> {
        if end < start {
            return Err(TripError::EndBeforeStart { start, end });
        }

        Ok(Trip {
            start,
            end,
            start_station: start_station.into(),
            end_station: end_station.into(),
            user_type: user_type.into(),
            gender: None,
            birth_year: None,
        })
    }

    /// Set the rider's gender. Blank values leave it unknown.
    pub fn with_gender(mut self, gender: Option<&str>) -> Self {
        self.gender = gender
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);
        self
    }

    /// Set the rider's birth year. Year 0 leaves it unknown.
    pub fn with_birth_year(mut self, year: Option<u16>) -> Self {
        self.birth_year = year.filter(|y| *y != 0);
        self
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn start_station(&self) -> &str {
        &self.start_station
    }

    pub fn end_station(&self) -> &str {
        &self.end_station
    }

    /// The `(start_station, end_station)` pair. Self-loops are valid routes.
    pub fn route(&self) -> (&str, &str) {
        (&self.start_station, &self.end_station)
    }

    pub fn user_type(&self) -> &str {
        &self.user_type
    }

    pub fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    pub fn birth_year(&self) -> Option<u16> {
        self.birth_year
    }

    /// Whole seconds between start and end. Never negative.
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown city '{0}' (expected chicago, new york city or washington)")]
pub struct CityError(pub String);

/// The three regional datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Default CSV file name for the city's dataset.
    pub fn file_name(self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            City::Chicago => "Chicago",
            City::NewYorkCity => "New York City",
            City::Washington => "Washington",
        };
        f.write_str(name)
    }
}

impl FromStr for City {
    type Err = CityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chicago" => Ok(City::Chicago),
            "new york city" | "new_york_city" | "nyc" => Ok(City::NewYorkCity),
            "washington" => Ok(City::Washington),
            _ => Err(CityError(s.to_string())),
        }
    }
}
