//! Test fixtures and data for orchestrator tests

use orchestrator::{DiscoveryTarget, InvocationResult, ObjectPath};
use shared::{FetchOutcome, UrlOutcome};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const BUCKET: &'static str = "discovered";
    pub const TEMPLATE: &'static str = "http://%s.test";

    /// Fuzz terms of the three-candidate walkthrough
    pub fn terms() -> Vec<String> {
        ["a", "b", "c"].iter().map(|s| s.to_string()).collect()
    }

    pub fn url(term: &str) -> String {
        format!("http://{term}.test")
    }

    pub fn output(prefix: &str) -> ObjectPath {
        ObjectPath::new(Self::BUCKET, prefix)
    }

    pub fn target(prefix: &str) -> DiscoveryTarget {
        DiscoveryTarget::new(Self::TEMPLATE, Self::output(prefix))
    }

    /// a answers 200, b answers 500, c fails to fetch
    pub fn scripted_outcome(url: &str) -> FetchOutcome {
        match url {
            "http://a.test" => FetchOutcome::Success(200),
            "http://b.test" => FetchOutcome::Success(500),
            _ => FetchOutcome::Error("connection reset by peer".to_string()),
        }
    }

    /// Scripted result covering every URL of `batch`
    pub fn scripted_result(batch: &[String]) -> InvocationResult {
        InvocationResult::new(
            batch
                .iter()
                .map(|url| UrlOutcome::new(url.clone(), Self::scripted_outcome(url)))
                .collect(),
        )
    }
}
