//! Canned-response client for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Request, Response};

use super::HttpClient;

/// Answers from a fixed URL → (status, body) table; unknown URLs get a 404.
#[derive(Default)]
pub(crate) struct StubClient {
    responses: HashMap<String, (u16, Vec<u8>)>,
    requested: Mutex<Vec<String>>,
}

impl StubClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_response(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.to_string(), (status, body.into()));
        self
    }

    /// URLs requested so far, in order.
    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        let url = req.url().to_string();
        self.requested.lock().unwrap().push(url.clone());

        let (status, body) = self
            .responses
            .get(&url)
            .cloned()
            .unwrap_or((404, Vec::new()));
        let resp = http::Response::builder()
            .status(status)
            .body(body)
            .unwrap();
        Ok(Response::from(resp))
    }
}
