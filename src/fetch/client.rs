use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam for remote dataset downloads, so loaders can run against a stub.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
