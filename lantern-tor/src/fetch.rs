//! Single-attempt page fetches with classified outcomes
//!
//! HTTP 4xx/5xx are ordinary `Success` responses carrying the status code;
//! only transport-level faults become failures. The caller decides what a
//! status code means.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;

use crate::TorClient;

/// The final response of a followed-redirect GET
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    /// Value of the Server header, if any
    pub server: Option<String>,
    pub body: String,
}

/// Classified result of a single fetch attempt; no retries at this layer
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Any response received, including non-2xx
    Success(PageResponse),
    /// Proxy or target unreachable; the caller cannot proceed
    ConnectionFailed(String),
    /// No response within the configured timeout
    TimedOut,
    /// Any other transport-level fault
    Failed(String),
}

/// Seam between the crawl engine and the network
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issue one GET and classify the outcome
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

pub type SharedFetcher = Arc<dyn PageFetcher>;

#[async_trait]
impl PageFetcher for TorClient {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.inner().get(url).send().await {
            Ok(resp) => resp,
            Err(e) => return classify(e),
        };

        let status = response.status().as_u16();
        let server = response
            .headers()
            .get(header::SERVER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match response.text().await {
            Ok(body) => FetchOutcome::Success(PageResponse {
                status,
                server,
                body,
            }),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

fn classify(err: reqwest::Error) -> FetchOutcome {
    if err.is_timeout() {
        FetchOutcome::TimedOut
    } else if err.is_connect() {
        FetchOutcome::ConnectionFailed(err.to_string())
    } else {
        FetchOutcome::Failed(err.to_string())
    }
}
