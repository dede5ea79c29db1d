//! Worker binary entry point
//!
//! Serves one slot of the fetch-worker pool over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use tokio::net::TcpListener;

use shared::{ProcessId, WorkerIndex, logging};
use worker::{FetchSettings, ReqwestFetcher, WorkerError, WorkerState, build_router, serve};

/// Stateless fetch worker for distributed URL discovery
#[derive(Parser)]
#[command(name = "worker")]
#[command(about = "Fetches batches of candidate URLs and reports status codes")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "WORKER_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Pool index served by this worker
    #[arg(long, env = "WORKER_INDEX", default_value = "0")]
    index: WorkerIndex,

    /// Per-URL request timeout in seconds (redirects included)
    #[arg(long, default_value = "30")]
    request_timeout_secs: u64,

    /// Per-URL connect timeout in seconds
    #[arg(long, default_value = "10")]
    connect_timeout_secs: u64,

    /// Maximum redirects followed per URL
    #[arg(long, default_value = "10")]
    redirect_limit: usize,

    /// Validate TLS certificates of candidate hosts
    #[arg(long)]
    verify_tls: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Tracing endpoint URL
    #[arg(long)]
    trace_ep: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    ProcessId::init_worker(args.index);
    let trace_endpoint = args.trace_ep.clone().map(logging::TracingEndpoint::new);
    logging::init_tracing_with_endpoint_and_level(trace_endpoint, Some(&args.log_level));
    logging::log_startup(ProcessId::current(), &format!("fetch worker {}", args.index));

    let settings = FetchSettings {
        connect_timeout: Duration::from_secs(args.connect_timeout_secs),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        redirect_limit: args.redirect_limit,
        accept_invalid_certs: !args.verify_tls,
    };
    let fetcher = ReqwestFetcher::new(settings)?;

    let listener = TcpListener::bind(args.bind).await.map_err(|e| WorkerError::Bind {
        addr: args.bind.to_string(),
        message: e.to_string(),
    })?;

    let router = build_router(Arc::new(WorkerState::new(args.index, fetcher)));
    serve(listener, router).await?;

    Ok(())
}
