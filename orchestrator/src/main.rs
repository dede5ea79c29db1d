//! Main entry point for the orchestrator binary
//!
//! Wires the configured object store and worker client into a
//! `DiscoveryOrchestrator` and runs every target once.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use orchestrator::core::load_fuzz_terms;
use orchestrator::services::DEFAULT_CONNECT_TIMEOUT;
use orchestrator::{
    DiscoveryConfig, DiscoveryOrchestrator, DiscoveryTarget, HttpWorkerInvoker, LocalObjectStore, ObjectStore,
    OrchestratorResult, S3ObjectStore, WorkerPool,
};
use shared::{default_fetch_headers, logging, process_debug, process_info, ProcessId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    S3,
    Local,
}

/// Discovers live URLs by fanning templated candidates out to fetch workers
#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(about = "Distributed URL discovery across a pool of fetch workers")]
pub struct Args {
    /// File with one fuzz term per line
    #[arg(long)]
    fuzz_terms: PathBuf,

    /// URL template with a %s or {} placeholder (repeatable)
    #[arg(long = "url-template", required = true)]
    url_templates: Vec<String>,

    /// Output path for the matching template, s3://bucket/prefix or bucket/prefix (repeatable)
    #[arg(long = "output-path", required = true)]
    output_paths: Vec<String>,

    /// First worker index of the pool (inclusive)
    #[arg(long, default_value = "0")]
    min_worker: u32,

    /// Last worker index of the pool (exclusive)
    #[arg(long, default_value = "10")]
    max_worker: u32,

    /// URLs per worker invocation
    #[arg(long, default_value = "100")]
    batch_size: usize,

    /// Worker endpoint template; {index} is replaced by the worker index
    #[arg(long, env = "WORKER_ENDPOINT", default_value = "http://worker-{index}:8080/invoke")]
    worker_endpoint: String,

    /// Dedup filter file, kept across runs (in-memory only when unset)
    #[arg(long, env = "BLOOM_FILTER_PATH")]
    bloom_filter_path: Option<PathBuf>,

    /// Expected number of distinct URLs, the filter grows past it
    #[arg(long, default_value = "1000000")]
    filter_capacity: usize,

    /// Target false-positive rate of the dedup filter
    #[arg(long, default_value = "0.001")]
    filter_fp_rate: f64,

    /// Keep errored URLs eligible for the next run
    #[arg(long)]
    retry_errored: bool,

    /// Live URLs buffered per output path before an object is written
    #[arg(long, default_value = "1000")]
    buffer_threshold: usize,

    /// Upper bound of the random delay before each dispatch, in seconds
    #[arg(long, default_value = "10")]
    max_jitter_secs: f64,

    /// Worker invocation timeout in seconds
    #[arg(long, default_value = "900")]
    invoke_timeout_secs: u64,

    /// Object store backend
    #[arg(long, value_enum, default_value = "s3")]
    store: StoreKind,

    /// Root directory of the local object store
    #[arg(long, default_value = "./output")]
    local_store_dir: PathBuf,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    aws_region: String,

    /// AWS profile from the shared config files
    #[arg(long, env = "AWS_PROFILE")]
    aws_profile: Option<String>,

    /// S3-compatible endpoint, also read from AWS_ENDPOINT_URL
    #[arg(long)]
    s3_endpoint: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Tracing endpoint URL
    #[arg(long)]
    trace_ep: Option<String>,
}

impl Args {
    fn discovery_config(&self) -> OrchestratorResult<DiscoveryConfig> {
        let max_jitter = Duration::try_from_secs_f64(self.max_jitter_secs)
            .map_err(|e| orchestrator::OrchestratorError::config(format!("Invalid max jitter: {e}")))?;

        let mut config = DiscoveryConfig::default()
            .with_batch_size(self.batch_size)
            .with_pool(WorkerPool::new(self.min_worker, self.max_worker)?)
            .with_max_jitter(max_jitter)
            .with_buffer_threshold(self.buffer_threshold)
            .with_filter(self.filter_capacity, self.filter_fp_rate)
            .with_retry_errored(self.retry_errored);
        if let Some(path) = &self.bloom_filter_path {
            config = config.with_bloom_filter_path(path);
        }
        config.validate()?;
        Ok(config)
    }

    async fn object_store(&self) -> Arc<dyn ObjectStore> {
        match self.store {
            StoreKind::S3 => Arc::new(
                S3ObjectStore::connect(&self.aws_region, self.aws_profile.as_deref(), self.s3_endpoint.as_deref()).await,
            ),
            StoreKind::Local => {
                process_info!(ProcessId::current(), "📁 Using local object store at {}", self.local_store_dir.display());
                Arc::new(LocalObjectStore::new(&self.local_store_dir))
            }
        }
    }
}

#[tokio::main]
async fn main() -> OrchestratorResult<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    ProcessId::init_orchestrator();
    let trace_endpoint = args.trace_ep.clone().map(logging::TracingEndpoint::new);
    logging::init_tracing_with_endpoint_and_level(trace_endpoint, Some(&args.log_level));
    logging::log_startup(ProcessId::current(), "URL discovery orchestrator");

    let config = args.discovery_config()?;
    let targets = DiscoveryTarget::zip(&args.url_templates, &args.output_paths)?;
    let terms = load_fuzz_terms(&args.fuzz_terms).await?;
    process_info!(
        ProcessId::current(),
        "📋 {} fuzz terms, {} targets, workers [{}, {})",
        terms.len(),
        targets.len(),
        config.pool.min,
        config.pool.max
    );
    process_debug!(ProcessId::current(), "Configuration: {:?}", config);

    let invoker = HttpWorkerInvoker::new(
        args.worker_endpoint.clone(),
        Duration::from_secs(args.invoke_timeout_secs),
        DEFAULT_CONNECT_TIMEOUT,
        default_fetch_headers(),
    )?;
    invoker.check_pool(config.pool)?;
    let store = args.object_store().await;

    let mut orchestrator = DiscoveryOrchestrator::from_config(config, invoker, store).await?;
    let summary = orchestrator.run(&targets, &terms).await?;

    println!("{summary}");
    logging::log_success(ProcessId::current(), "Discovery run finished");
    Ok(())
}
