//! Real URL fetcher backed by reqwest

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;

use shared::{FetchOutcome, ProcessId, process_debug};
use crate::error::{WorkerError, WorkerResult};
use crate::traits::UrlFetcher;

/// HTTP client settings for a worker
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    /// Skip certificate validation of candidate hosts
    pub accept_invalid_certs: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 10,
            accept_invalid_certs: true,
        }
    }
}

/// Fetcher that issues one GET per URL through a shared connection pool
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> WorkerResult<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .redirect(Policy::limited(settings.redirect_limit))
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| WorkerError::ClientBuild { message: e.to_string() })?;

        Ok(Self { client })
    }

    fn header_map(headers: &HashMap<String, String>) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => {
                    process_debug!(ProcessId::current(), "Skipping invalid request header '{}'", name);
                }
            }
        }
        map
    }
}

#[async_trait]
impl UrlFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, headers: &HashMap<String, String>) -> FetchOutcome {
        let response = match self.client.get(url).headers(Self::header_map(headers)).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Error(e.to_string()),
        };

        let status = response.status().as_u16();

        // A body that cannot be read to the end counts as a failed fetch
        match response.bytes().await {
            Ok(_) => FetchOutcome::Success(status),
            Err(e) => FetchOutcome::Error(e.to_string()),
        }
    }
}
