//! Orchestrator ↔ Worker invocation protocol
//!
//! The orchestrator posts an [`InvokeRequest`] carrying one batch of URLs to a
//! worker; the worker answers with an [`InvokeResponse`] whose parallel arrays
//! partition that batch into responded URLs and errored URLs.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Request body sent to a worker for one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeRequest {
    #[serde(alias = "url_list")]
    pub urls: Vec<String>,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".to_string()
}

impl InvokeRequest {
    /// GET request for `urls` with the given header set
    pub fn get(urls: Vec<String>, headers: HashMap<String, String>) -> Self {
        Self {
            urls,
            headers,
            method: default_method(),
        }
    }
}

/// Per-URL result of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOutcome {
    /// A response arrived (any status, redirects already followed)
    Success(u16),
    /// Network error, timeout, or malformed response
    Error(String),
}

impl FetchOutcome {
    /// True for a response whose status code starts with `2`
    pub fn is_live(&self) -> bool {
        matches!(self, FetchOutcome::Success(status) if (200..300).contains(status))
    }
}

/// A URL paired with its fetch outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlOutcome {
    pub url: String,
    pub outcome: FetchOutcome,
}

impl UrlOutcome {
    pub fn new(url: impl Into<String>, outcome: FetchOutcome) -> Self {
        Self {
            url: url.into(),
            outcome,
        }
    }
}

/// Response body returned by a worker
///
/// `url_list[i]` answered with `status_code_list[i]`; `error_url_list[i]`
/// failed with `error_list[i]`. Every field is required: a payload missing
/// any of them does not deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResponse {
    pub url_list: Vec<String>,
    pub status_code_list: Vec<u16>,
    pub error_url_list: Vec<String>,
    pub error_list: Vec<String>,
}

impl InvokeResponse {
    /// Partition per-URL outcomes into the parallel response arrays
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = UrlOutcome>,
    {
        let mut response = Self::default();
        for UrlOutcome { url, outcome } in outcomes {
            match outcome {
                FetchOutcome::Success(status) => {
                    response.url_list.push(url);
                    response.status_code_list.push(status);
                }
                FetchOutcome::Error(message) => {
                    response.error_url_list.push(url);
                    response.error_list.push(message);
                }
            }
        }
        response
    }

    /// Total number of URLs reported, responded and errored
    pub fn len(&self) -> usize {
        self.url_list.len() + self.error_url_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the parallel arrays line up
    pub fn is_well_formed(&self) -> bool {
        self.url_list.len() == self.status_code_list.len()
            && self.error_url_list.len() == self.error_list.len()
    }
}

/// Browser-like header set sent with every fetch
pub fn default_fetch_headers() -> HashMap<String, String> {
    [
        (
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9",
        ),
        ("accept-language", "en-GB,en-US;q=0.9,en;q=0.8"),
        (
            "sec-ch-ua",
            "\".Not/A)Brand\";v=\"99\", \"Google Chrome\";v=\"103\", \"Chromium\";v=\"103\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"macOS\""),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
        ("upgrade-insecure-requests", "1"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}
