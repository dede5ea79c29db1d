//! HTTP client for remote fetch workers
//!
//! Each worker in the pool is reachable at an endpoint derived from a
//! template by substituting its index for `{index}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use shared::{InvokeRequest, InvokeResponse, ProcessId, WorkerIndex, default_fetch_headers, process_debug};

use crate::core::InvocationResult;
use crate::error::{InvocationError, OrchestratorError, OrchestratorResult};
use crate::traits::WorkerInvoker;
use crate::types::WorkerPool;

/// Placeholder replaced by the worker index in endpoint templates
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Worker requests fetch whole batches, so they are allowed to take long
pub const DEFAULT_INVOKE_TIMEOUT: Duration = Duration::from_secs(900);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in an `HttpStatus` error
const MAX_ERROR_BODY: usize = 512;

pub struct HttpWorkerInvoker {
    client: Client,
    endpoint_template: String,
    /// Headers the workers send with every fetch
    headers: HashMap<String, String>,
}

impl HttpWorkerInvoker {
    pub fn new(
        endpoint_template: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
        headers: HashMap<String, String>,
    ) -> OrchestratorResult<Self> {
        let endpoint_template = endpoint_template.into();
        if !endpoint_template.contains(INDEX_PLACEHOLDER) {
            return Err(OrchestratorError::config(format!(
                "worker endpoint '{endpoint_template}' has no {INDEX_PLACEHOLDER} placeholder"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| OrchestratorError::config(format!("cannot build worker http client: {e}")))?;

        Ok(Self {
            client,
            endpoint_template,
            headers,
        })
    }

    /// Client with the default timeouts and browser-like fetch headers
    pub fn with_defaults(endpoint_template: impl Into<String>) -> OrchestratorResult<Self> {
        Self::new(
            endpoint_template,
            DEFAULT_INVOKE_TIMEOUT,
            DEFAULT_CONNECT_TIMEOUT,
            default_fetch_headers(),
        )
    }

    pub fn endpoint(&self, worker: WorkerIndex) -> Result<Url, InvocationError> {
        let raw = self.endpoint_template.replace(INDEX_PLACEHOLDER, &worker.to_string());
        Url::parse(&raw).map_err(|_| InvocationError::InvalidEndpoint { worker, endpoint: raw })
    }

    /// Reject a template that does not yield a valid URL for every pool member
    pub fn check_pool(&self, pool: WorkerPool) -> OrchestratorResult<()> {
        for worker in pool.members() {
            self.endpoint(worker).map_err(|e| OrchestratorError::config(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl WorkerInvoker for HttpWorkerInvoker {
    async fn invoke(&self, urls: &[String], worker: WorkerIndex) -> Result<InvocationResult, InvocationError> {
        let endpoint = self.endpoint(worker)?;
        let request = InvokeRequest::get(urls.to_vec(), self.headers.clone());

        process_debug!(
            ProcessId::current(),
            "📤 Invoking worker {} at {} with {} urls",
            worker,
            endpoint,
            urls.len()
        );

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| InvocationError::Transport {
                worker,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
                body.truncate(cut);
            }
            return Err(InvocationError::HttpStatus {
                worker,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| InvocationError::Transport {
            worker,
            message: e.to_string(),
        })?;
        let decoded: InvokeResponse =
            serde_json::from_slice(&bytes).map_err(|e| InvocationError::MalformedResponse {
                worker,
                message: e.to_string(),
            })?;

        InvocationResult::from_response(worker, decoded)
    }
}
