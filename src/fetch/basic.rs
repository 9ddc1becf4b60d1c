use std::time::Duration;

use super::client::HttpClient;
use async_trait::async_trait;

/// Dataset downloads can be large; allow a generous but finite transfer time.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// [`HttpClient`] backed by `reqwest`, with gzip transfer encoding and a timeout.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bikeshare_stats/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
