//! Where each city's dataset lives.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::trip::City;

/// Default location of the city datasets.
pub const DATA_DIR_ENV: &str = "BIKESHARE_DATA_DIR";
/// Optional path to a JSON file overriding per-city sources.
pub const CITY_CONFIG_ENV: &str = "BIKESHARE_CITY_CONFIG";

/// Maps cities to dataset sources.
///
/// Overrides are stored as a plain JSON object keyed by city. Keys accept any
/// spelling [`City`] parses (`"nyc"`, `"New York City"`, `"new_york_city"`):
/// ```json
/// {
///   "chicago": "chicago_2017.csv.gz",
///   "washington": "https://example.org/bikeshare/washington.csv"
/// }
/// ```
/// A source is a file name relative to the data directory, an absolute path, or
/// an `http(s)` URL. Cities without an override use [`City::file_name`].
#[derive(Debug, Default)]
pub struct CityConfig {
    entries: HashMap<City, String>,
}

impl CityConfig {
    /// Loads overrides from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading city config {path}"))?;
        let raw: HashMap<String, String> =
            serde_json::from_str(&content).with_context(|| format!("parsing city config {path}"))?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (key, source) in raw {
            let city: City = key
                .parse()
                .with_context(|| format!("city config {path} names unknown city '{key}'"))?;
            if entries.insert(city, source).is_some() {
                anyhow::bail!("city config {path} lists {city} more than once");
            }
        }

        debug!(path, overrides = entries.len(), "Loaded city config");
        Ok(Self { entries })
    }

    /// Loads from `$BIKESHARE_CITY_CONFIG` when set, otherwise no overrides.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CITY_CONFIG_ENV) {
            Ok(path) => Self::load(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// The configured source for `city`, before resolution against a data dir.
    pub fn file_for(&self, city: City) -> &str {
        self.entries
            .get(&city)
            .map(String::as_str)
            .unwrap_or(city.file_name())
    }

    /// Full source for `city`: a URL or a path joined onto `data_dir`.
    pub fn source_for(&self, city: City, data_dir: &str) -> String {
        let file = self.file_for(city);
        if is_url(file) || Path::new(file).is_absolute() {
            return file.to_string();
        }

        if is_url(data_dir) {
            format!("{}/{}", data_dir.trim_end_matches('/'), file)
        } else {
            Path::new(data_dir).join(file).display().to_string()
        }
    }
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// The data directory from `$BIKESHARE_DATA_DIR`, or the working directory.
pub fn data_dir_from_env() -> String {
    std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| ".".to_string())
}
