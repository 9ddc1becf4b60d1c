//! Reading raw dataset bytes from disk or over HTTP.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

#[cfg(test)]
pub(crate) mod stub;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::is_url;

/// GETs `url` and returns the body. Non-success statuses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads a dataset from a local path or fetches it when `source` is a URL.
#[tracing::instrument(skip(client))]
pub async fn read_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_url(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("fetching {source}"))?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("reading {source}"))?
    };

    debug!(bytes = bytes.len(), "Dataset bytes loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use stub::StubClient;

    #[tokio::test]
    async fn test_read_source_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Start Time,End Time\n").unwrap();

        let bytes = read_source(&BasicClient::new().unwrap(), file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(bytes, b"Start Time,End Time\n");
    }

    #[tokio::test]
    async fn test_read_source_url_returns_body() {
        let url = "https://data.example.org/bikes/chicago.csv";
        let client = StubClient::new().with_response(url, 200, "Start Time,End Time\n");

        let bytes = read_source(&client, url).await.unwrap();
        assert_eq!(bytes, b"Start Time,End Time\n");
        assert_eq!(client.requested(), [url]);
    }

    #[tokio::test]
    async fn test_read_source_url_not_found() {
        let url = "https://data.example.org/bikes/boston.csv";
        let client = StubClient::new().with_response(url, 404, "not found");

        let err = read_source(&client, url).await.unwrap_err();
        assert!(err.to_string().contains("fetching https://data.example.org/bikes/boston.csv"));
        assert!(format!("{err:#}").contains("404"));
    }

    #[tokio::test]
    async fn test_read_source_missing_file() {
        let err = read_source(&BasicClient::new().unwrap(), "/nonexistent/bikeshare/chicago.csv")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("chicago.csv"));
    }
}
