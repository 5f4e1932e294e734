//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester:
//! - Building HTTP clients with the configured user agent
//! - GET requests with a language preference header
//! - Classifying transport failures as per-item errors

use crate::config::UserAgentConfig;
use crate::HarvestError;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Source of raw page bodies
///
/// Implementations return `Err` only for transport-level failures. A
/// response with a non-success status still yields its body.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Fetches `url`, asking the server for pages in `lang`
    async fn fetch(&self, url: &str, lang: &str) -> Result<String, HarvestError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `https_only` - Refuse plain-http requests
///
/// # Example
///
/// ```no_run
/// use support_harvest::config::UserAgentConfig;
/// use support_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), true).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    https_only: bool,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.agent.as_str())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .https_only(https_only)
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Accept-Language` value preferring `lang` with English as fallback
pub fn accept_language(lang: &str) -> String {
    format!("{},en;q=0.7", lang)
}

/// Fetcher backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from the user agent configuration
    pub fn new(config: &UserAgentConfig, https_only: bool) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, https_only)?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, lang: &str) -> Result<String, HarvestError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, accept_language(lang))
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            // Muted: the error page body is handed on like any other
            tracing::warn!("{} returned HTTP {}", url, status.as_u16());
        }

        response.text().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })
    }
}
