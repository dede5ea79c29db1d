//! Shared logging utilities for consistent tracing across orchestrator and workers

use crate::types::ProcessId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber, error, info};
use tracing_subscriber::layer::Context;

/// Remote collector that receives batched trace events
#[derive(Debug, Clone)]
pub struct TracingEndpoint {
    pub url: String,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl TracingEndpoint {
    pub fn new(url: String) -> Self {
        Self {
            url,
            batch_size: 20,
            flush_interval: Duration::from_millis(500),
        }
    }
}

/// Structured trace event posted to the collector
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TraceEvent {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
    pub process: String,
    pub fields: HashMap<String, serde_json::Value>,
}

/// Tracing layer that forwards `process_*` events to a remote endpoint
///
/// Events are handed to a background task which posts them in batches of
/// `batch_size`, or whatever has accumulated every `flush_interval`.
pub struct HttpTracingLayer {
    sender: mpsc::UnboundedSender<TraceEvent>,
}

impl HttpTracingLayer {
    /// Must be called from within a tokio runtime
    pub fn new(endpoint: TracingEndpoint) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<TraceEvent>();
        let TracingEndpoint {
            url,
            batch_size,
            flush_interval,
        } = endpoint;

        tokio::spawn(async move {
            let client = reqwest::Client::new();
            let mut buffer = Vec::with_capacity(batch_size);
            let mut flush_timer = tokio::time::interval(flush_interval);

            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Some(event) => {
                            buffer.push(event);
                            if buffer.len() >= batch_size {
                                Self::send_batch(&client, &url, &mut buffer).await;
                            }
                        }
                        None => {
                            if !buffer.is_empty() {
                                Self::send_batch(&client, &url, &mut buffer).await;
                            }
                            break;
                        }
                    },
                    _ = flush_timer.tick() => {
                        if !buffer.is_empty() {
                            Self::send_batch(&client, &url, &mut buffer).await;
                        }
                    }
                }
            }
        });

        HttpTracingLayer { sender: tx }
    }

    async fn send_batch(client: &reqwest::Client, endpoint_url: &str, buffer: &mut Vec<TraceEvent>) {
        let batch = std::mem::take(buffer);

        // The subscriber is this layer, so failures go to stderr rather than back into tracing
        match client.post(endpoint_url).json(&batch).send().await {
            Ok(response) if !response.status().is_success() => {
                eprintln!("Failed to send {} traces: HTTP {}", batch.len(), response.status());
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Failed to send {} traces: {e}", batch.len());
            }
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for HttpTracingLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut fields = HashMap::new();
        let mut message = String::new();

        let mut visitor = TraceVisitor {
            message: &mut message,
            fields: &mut fields,
        };
        event.record(&mut visitor);

        // Only events emitted through the process_* macros carry a process tag
        if !fields.contains_key("process") {
            return;
        }

        let trace_event = TraceEvent {
            timestamp: Utc::now(),
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message,
            process: ProcessId::current().to_string(),
            fields,
        };

        let _ = self.sender.send(trace_event);
    }
}

/// Visitor to extract event fields and message
struct TraceVisitor<'a> {
    message: &'a mut String,
    fields: &'a mut HashMap<String, serde_json::Value>,
}

impl tracing::field::Visit for TraceVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message.push_str(&format!("{value:?}"));
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(format!("{value:?}")),
            );
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.fields
                .insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }
}

/// Per-process filter directives
fn level_filter(process_id: &ProcessId, base_level: &str) -> String {
    match process_id {
        ProcessId::Orchestrator => format!(
            "orchestrator={base_level},shared={base_level},aws_config=warn,aws_smithy_runtime=warn,hyper=warn"
        ),
        ProcessId::Worker(_) => {
            format!("worker={base_level},shared={base_level},reqwest=warn,hyper=warn,tower_http=warn")
        }
    }
}

/// Initialize tracing subscriber with optional endpoint and log level
///
/// `ProcessId` should be initialized first so events carry the right identity.
pub fn init_tracing_with_endpoint_and_level(endpoint: Option<TracingEndpoint>, log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = level_filter(ProcessId::current(), log_level.unwrap_or("info"));

    match endpoint {
        Some(endpoint) => {
            let http_layer = HttpTracingLayer::new(endpoint);
            let fmt_layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact();

            tracing_subscriber::registry()
                .with(EnvFilter::new(&filter))
                .with(http_layer)
                .with(fmt_layer)
                .init();
        }
        None => {
            fmt()
                .with_env_filter(EnvFilter::new(&filter))
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .init();
        }
    }
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for process-aware info logging
#[macro_export]
macro_rules! process_info {
    ($process_id:expr, $($arg:tt)*) => {
        tracing::info!(
            process = %$process_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware warning logging
#[macro_export]
macro_rules! process_warn {
    ($process_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            process = %$process_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware error logging
#[macro_export]
macro_rules! process_error {
    ($process_id:expr, $($arg:tt)*) => {
        tracing::error!(
            process = %$process_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware debug logging
#[macro_export]
macro_rules! process_debug {
    ($process_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            process = %$process_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(process_id: &ProcessId, details: &str) {
    info!(
        process = %process_id,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(process_id: &ProcessId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        process = %process_id,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(process_id: &ProcessId, message: &str) {
    info!(
        process = %process_id,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}

/// Contextual logging helper for progress updates
pub fn log_progress(process_id: &ProcessId, action: &str, details: &str) {
    info!(
        process = %process_id,
        timestamp = format_timestamp(),
        "📋 {}: {}",
        action,
        details
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_per_process() {
        let orchestrator = level_filter(&ProcessId::Orchestrator, "debug");
        assert!(orchestrator.starts_with("orchestrator=debug"));
        assert!(orchestrator.contains("aws_config=warn"));

        let worker = level_filter(&ProcessId::Worker(3), "info");
        assert!(worker.starts_with("worker=info"));
        assert!(worker.contains("reqwest=warn"));
    }

    #[test]
    fn test_timestamp_format() {
        let stamp = format_timestamp();
        // HH:MM:SS.mmm
        assert_eq!(stamp.len(), 12);
        assert_eq!(&stamp[2..3], ":");
        assert_eq!(&stamp[8..9], ".");
    }
}
