//! Fetch abstraction and the blocking HTTP implementation.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONNECTION};
use reqwest::StatusCode;

use crate::config::{FetcherConfig, USER_AGENT};
use crate::error::{FetchError, HarvesterError, Result};

/// Successful response to a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Retrieves the bytes addressed by a source identifier.
///
/// The harvester treats a fetch as a black box: the implementation decides
/// on redirects, caching or retries. Implement this to supply custom
/// transport behaviour, or to script responses in tests.
pub trait Fetcher {
    fn fetch(&self, source: &str) -> std::result::Result<FetchResponse, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, source: &str) -> std::result::Result<FetchResponse, FetchError> {
        (**self).fetch(source)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, source: &str) -> std::result::Result<FetchResponse, FetchError> {
        (**self).fetch(source)
    }
}

/// Fetcher backed by a blocking reqwest client.
///
/// Only `200 OK` counts as success. Every request opens its own connection.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let timeout = config.effective_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(HarvesterError::Client)?;
        Ok(Self { client, timeout })
    }

    /// The bounded wait applied to each request.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, source: &str) -> std::result::Result<FetchResponse, FetchError> {
        tracing::debug!(url = source, "Fetching");

        let response = self
            .client
            .get(source)
            .header(CONNECTION, HeaderValue::from_static("close"))
            .send()
            .map_err(|e| self.classify(source, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(url = source, status = %status, "Non-200 response");
            return Err(FetchError::NonSuccessStatus {
                url: source.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|e| self.classify(source, e))?;
        tracing::debug!(url = source, bytes = body.len(), "Fetched");

        Ok(FetchResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}
