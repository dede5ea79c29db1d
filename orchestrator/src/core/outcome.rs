//! Typed worker results and their partition invariant

use std::collections::HashSet;

use shared::{FetchOutcome, InvokeResponse, UrlOutcome, WorkerIndex};
use crate::error::{InvocationError, OrchestratorError, OrchestratorResult};

/// Decoded result of one successful invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationResult {
    pub outcomes: Vec<UrlOutcome>,
}

impl InvocationResult {
    pub fn new(outcomes: Vec<UrlOutcome>) -> Self {
        Self { outcomes }
    }

    /// Convert the wire response, rejecting misaligned parallel arrays
    pub fn from_response(worker: WorkerIndex, response: InvokeResponse) -> Result<Self, InvocationError> {
        if !response.is_well_formed() {
            return Err(InvocationError::MalformedResponse {
                worker,
                message: format!(
                    "{} urls with {} status codes, {} error urls with {} errors",
                    response.url_list.len(),
                    response.status_code_list.len(),
                    response.error_url_list.len(),
                    response.error_list.len()
                ),
            });
        }

        let InvokeResponse {
            url_list,
            status_code_list,
            error_url_list,
            error_list,
        } = response;

        let responded = url_list
            .into_iter()
            .zip(status_code_list)
            .map(|(url, status)| UrlOutcome::new(url, FetchOutcome::Success(status)));
        let errored = error_url_list
            .into_iter()
            .zip(error_list)
            .map(|(url, message)| UrlOutcome::new(url, FetchOutcome::Error(message)));

        Ok(Self::new(responded.chain(errored).collect()))
    }

    /// URLs whose status code is success-class
    pub fn live_urls(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_live())
            .map(|o| o.url.clone())
            .collect()
    }

    /// URLs that got any response
    pub fn responded_urls(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, FetchOutcome::Success(_)))
            .map(|o| o.url.clone())
            .collect()
    }

    /// URLs whose fetch failed inside the worker
    pub fn errored_urls(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, FetchOutcome::Error(_)))
            .map(|o| o.url.clone())
            .collect()
    }

    /// Check that the outcomes partition `batch`
    ///
    /// A URL reported both as responded and errored is a protocol breach and
    /// yields the fatal [`OrchestratorError::InvariantViolation`]. Missing or
    /// unexpected URLs make the invocation unusable and are reported as
    /// [`InvocationError::IncompleteOutcome`].
    pub fn check_partition(&self, worker: WorkerIndex, batch: &[String]) -> OrchestratorResult<()> {
        let responded: HashSet<String> = self.responded_urls().into_iter().collect();
        let errored: HashSet<String> = self.errored_urls().into_iter().collect();

        let mut overlapping: Vec<String> = responded.intersection(&errored).cloned().collect();
        if !overlapping.is_empty() {
            overlapping.sort();
            return Err(OrchestratorError::InvariantViolation { worker, overlapping });
        }

        let expected: HashSet<&String> = batch.iter().collect();
        let reported: HashSet<&String> = responded.iter().chain(errored.iter()).collect();
        let missing = expected.difference(&reported).count();
        let duplicates = self.outcomes.len() - reported.len();
        let unexpected = reported.difference(&expected).count() + duplicates;

        if missing > 0 || unexpected > 0 {
            return Err(InvocationError::IncompleteOutcome {
                worker,
                missing,
                unexpected,
            }
            .into());
        }
        Ok(())
    }
}
