//! Tor SOCKS5h proxy client
//!
//! Builds HTTP clients that route through Tor for .onion access. Both the
//! http and https schemes map to their own configured proxy endpoint, and
//! hostname resolution happens proxy-side so the target never leaks to a
//! local resolver.

use std::time::Duration;

use lantern_core::Settings;
use reqwest::{redirect, Client, Proxy};
use thiserror::Error;

/// Errors from Tor networking
#[derive(Debug, Error)]
pub enum TorError {
    #[error("Failed to build Tor client: {0}")]
    ClientBuild(String),

    #[error("Invalid proxy endpoint '{0}': {1}")]
    InvalidProxy(String, String),
}

/// Redirects followed per request before giving up
const MAX_REDIRECTS: usize = 5;

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// HTTP client routing every request through the configured Tor proxies
#[derive(Debug, Clone)]
pub struct TorClient {
    client: Client,
}

impl TorClient {
    /// Build a client from the scanner settings
    pub fn new(settings: &Settings) -> Result<Self, TorError> {
        let http_proxy = Proxy::http(&settings.http_proxy)
            .map_err(|e| TorError::InvalidProxy(settings.http_proxy.clone(), e.to_string()))?;
        let https_proxy = Proxy::https(&settings.https_proxy)
            .map_err(|e| TorError::InvalidProxy(settings.https_proxy.clone(), e.to_string()))?;

        let client = Client::builder()
            .proxy(http_proxy)
            .proxy(https_proxy)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .cookie_store(true) // cookies survive redirects, nothing more
            .user_agent(random_user_agent())
            .danger_accept_invalid_certs(true) // Many .onion sites have self-signed certs
            .build()
            .map_err(|e| TorError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }

    pub(crate) fn inner(&self) -> &Client {
        &self.client
    }
}

/// Check if the Tor proxy is reachable
pub async fn check_tor_connection(settings: &Settings) -> Result<bool, TorError> {
    let client = TorClient::new(settings)?;

    // Try to reach a known .onion address (Tor Project's)
    let result = client
        .inner()
        .get("http://2gzyxa5ihm7nsggfxnu52rck2vv4rvmdlkiu3ber7fzs2xqxczfebsid.onion/")
        .send()
        .await;

    match result {
        Ok(resp) => Ok(resp.status().is_success() || resp.status().is_redirection()),
        Err(_) => Ok(false),
    }
}
