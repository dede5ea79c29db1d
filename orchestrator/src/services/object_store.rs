//! Object store implementations
//!
//! `S3ObjectStore` talks to S3 or any S3-compatible endpoint; `LocalObjectStore`
//! lays the same `bucket/key` namespace out on a directory tree for local runs
//! and tests.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client as S3Client;
use tokio::fs;

use shared::{ProcessId, process_debug, process_info};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::ObjectStore;
use crate::types::ObjectPath;

/// Region S3 creates buckets in when no location constraint is sent
const DEFAULT_S3_REGION: &str = "us-east-1";

/// Every trimmed, non-empty line of every object under `path`
pub async fn read_lines<S>(store: &S, path: &ObjectPath) -> OrchestratorResult<HashSet<String>>
where
    S: ObjectStore + ?Sized,
{
    let keys = store.list_keys(&path.bucket, &path.list_prefix()).await?;
    let mut lines = HashSet::new();

    for key in &keys {
        let bytes = store.get_object(&path.bucket, key).await?;
        let text = String::from_utf8_lossy(&bytes);
        lines.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    process_debug!(
        ProcessId::current(),
        "📖 Read {} lines from {} objects under {}",
        lines.len(),
        keys.len(),
        path
    );
    Ok(lines)
}

/// S3 (or S3-compatible) object store
pub struct S3ObjectStore {
    client: S3Client,
    region: String,
}

impl S3ObjectStore {
    /// Build a client from the default AWS provider chain
    ///
    /// `endpoint` targets an S3-compatible service such as MinIO and switches
    /// to path-style addressing; `AWS_ENDPOINT_URL` is used when it is unset.
    pub async fn connect(region: &str, profile: Option<&str>, endpoint: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let aws_config = loader.load().await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&aws_config);
        let endpoint = endpoint
            .map(str::to_string)
            .or_else(|| std::env::var("AWS_ENDPOINT_URL").ok());
        if let Some(endpoint) = &endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        process_info!(
            ProcessId::current(),
            "🪣 S3 client configured (region {}, endpoint {})",
            region,
            endpoint.as_deref().unwrap_or("default")
        );

        Self {
            client: S3Client::from_conf(s3_config.build()),
            region: region.to_string(),
        }
    }

    pub fn from_client(client: S3Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_bucket(&self, bucket: &str) -> OrchestratorResult<()> {
        if self.client.head_bucket().bucket(bucket).send().await.is_ok() {
            return Ok(());
        }

        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_S3_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                process_info!(ProcessId::current(), "🪣 Created bucket {}", bucket);
                Ok(())
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_bucket_already_owned_by_you()) =>
            {
                Ok(())
            }
            Err(e) => Err(OrchestratorError::store(
                "create_bucket",
                bucket,
                DisplayErrorContext(&e),
            )),
        }
    }

    async fn put_object(&self, bucket: &str, key: &str, body: String) -> OrchestratorResult<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("text/plain; charset=utf-8")
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .map_err(|e| OrchestratorError::store("put_object", format!("{bucket}/{key}"), DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> OrchestratorResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let result = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await;

            let page = match result {
                Ok(page) => page,
                // A bucket that does not exist yet holds nothing; it is created before the first write
                Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_bucket()) => {
                    process_debug!(ProcessId::current(), "🪣 Bucket {} does not exist yet", bucket);
                    return Ok(Vec::new());
                }
                Err(e) => {
                    return Err(OrchestratorError::store(
                        "list_objects_v2",
                        format!("{bucket}/{prefix}"),
                        DisplayErrorContext(&e),
                    ))
                }
            };

            keys.extend(page.contents().iter().filter_map(|object| object.key().map(str::to_string)));

            match page.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> OrchestratorResult<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| OrchestratorError::store("get_object", format!("{bucket}/{key}"), DisplayErrorContext(&e)))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| OrchestratorError::store("get_object", format!("{bucket}/{key}"), e))?;
        Ok(body.into_bytes().to_vec())
    }
}

/// Directory-backed object store: `{root}/{bucket}/{key}`
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> OrchestratorResult<PathBuf> {
        Ok(self.root.join(checked_relative(bucket)?))
    }

    fn object_file(&self, bucket: &str, key: &str) -> OrchestratorResult<PathBuf> {
        Ok(self.bucket_dir(bucket)?.join(checked_relative(key)?))
    }
}

/// Reject names that would escape the store root
fn checked_relative(name: &str) -> OrchestratorResult<PathBuf> {
    let path = PathBuf::from(name);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if name.is_empty() || escapes {
        return Err(OrchestratorError::InvalidObjectPath { path: name.to_string() });
    }
    Ok(path)
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn ensure_bucket(&self, bucket: &str) -> OrchestratorResult<()> {
        let dir = self.bucket_dir(bucket)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| OrchestratorError::store("ensure_bucket", dir.display().to_string(), e))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: String) -> OrchestratorResult<()> {
        let file = self.object_file(bucket, key)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| OrchestratorError::store("put_object", parent.display().to_string(), e))?;
        }
        fs::write(&file, body)
            .await
            .map_err(|e| OrchestratorError::store("put_object", file.display().to_string(), e))
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> OrchestratorResult<Vec<String>> {
        let bucket_dir = self.bucket_dir(bucket)?;
        if !fs::try_exists(&bucket_dir).await? {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let mut pending = vec![bucket_dir.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| OrchestratorError::store("list_keys", dir.display().to_string(), e))?;

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&bucket_dir) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> OrchestratorResult<Vec<u8>> {
        let file = self.object_file(bucket, key)?;
        fs::read(&file)
            .await
            .map_err(|e| OrchestratorError::store("get_object", file.display().to_string(), e))
    }
}
