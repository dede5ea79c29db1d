//! Trait definitions with mockall annotations for testing

use std::collections::HashMap;
use shared::FetchOutcome;

/// Single-URL fetch abstraction
///
/// Implementations never fail: every problem reaching the URL is reported
/// as [`FetchOutcome::Error`] so one bad URL cannot abort its batch.
#[mockall::automock]
#[async_trait::async_trait]
pub trait UrlFetcher: Send + Sync {
    /// Fetch `url` once with the given request headers
    async fn fetch(&self, url: &str, headers: &HashMap<String, String>) -> FetchOutcome;
}
