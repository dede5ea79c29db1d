//! Buffered object writer
//!
//! Confirmed-live URLs are collected per output path and committed as
//! newline-separated text objects under fresh UUID keys, so no object is
//! ever overwritten.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use shared::{ProcessId, process_info};

use crate::error::OrchestratorResult;
use crate::traits::ObjectStore;
use crate::types::ObjectPath;

pub struct BufferedWriter<S: ObjectStore + ?Sized> {
    store: Arc<S>,
    buffers: HashMap<ObjectPath, Vec<String>>,
    /// Buffered URLs per path that trigger an automatic flush
    threshold: usize,
    /// Buckets already checked or created during this run
    ensured_buckets: HashSet<String>,
    objects_written: usize,
}

impl<S: ObjectStore + ?Sized> BufferedWriter<S> {
    pub fn new(store: Arc<S>, threshold: usize) -> Self {
        Self {
            store,
            buffers: HashMap::new(),
            threshold: threshold.max(1),
            ensured_buckets: HashSet::new(),
            objects_written: 0,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Add URLs to the buffer for `path`
    ///
    /// Every time the buffer reaches the threshold, the first `threshold` URLs
    /// are written as one object. On a write failure those URLs stay buffered
    /// and the error is returned.
    ///
    /// # Returns
    /// Keys of the objects written automatically.
    pub async fn append(&mut self, path: &ObjectPath, urls: Vec<String>) -> OrchestratorResult<Vec<String>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }
        self.buffers.entry(path.clone()).or_default().extend(urls);

        let mut written = Vec::new();
        while self.buffered(path) >= self.threshold {
            let chunk: Vec<String> = match self.buffers.get(path) {
                Some(buffer) => buffer[..self.threshold].to_vec(),
                None => break,
            };
            let key = self.write_object(path, &chunk).await?;
            if let Some(buffer) = self.buffers.get_mut(path) {
                buffer.drain(..self.threshold);
            }
            written.push(key);
        }
        Ok(written)
    }

    /// Write everything buffered for `path` as one object
    ///
    /// # Returns
    /// The new object key, or `None` when nothing was buffered.
    pub async fn flush(&mut self, path: &ObjectPath) -> OrchestratorResult<Option<String>> {
        let Some(buffer) = self.buffers.get(path).filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        let chunk = buffer.clone();

        let key = self.write_object(path, &chunk).await?;
        self.buffers.remove(path);
        Ok(Some(key))
    }

    /// Flush every non-empty buffer, stopping at the first failure
    pub async fn flush_all(&mut self) -> OrchestratorResult<Vec<String>> {
        let mut paths: Vec<ObjectPath> = self
            .buffers
            .iter()
            .filter(|(_, buffer)| !buffer.is_empty())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();

        let mut written = Vec::with_capacity(paths.len());
        for path in &paths {
            if let Some(key) = self.flush(path).await? {
                written.push(key);
            }
        }
        Ok(written)
    }

    /// URLs waiting to be written for `path`
    pub fn buffered(&self, path: &ObjectPath) -> usize {
        self.buffers.get(path).map_or(0, Vec::len)
    }

    pub fn buffered_urls(&self, path: &ObjectPath) -> &[String] {
        self.buffers.get(path).map_or(&[][..], Vec::as_slice)
    }

    pub fn objects_written(&self) -> usize {
        self.objects_written
    }

    async fn write_object(&mut self, path: &ObjectPath, urls: &[String]) -> OrchestratorResult<String> {
        if !self.ensured_buckets.contains(&path.bucket) {
            self.store.ensure_bucket(&path.bucket).await?;
            self.ensured_buckets.insert(path.bucket.clone());
        }

        let key = path.object_key(&uuid::Uuid::new_v4().to_string());
        let mut body = urls.join("\n");
        body.push('\n');

        self.store.put_object(&path.bucket, &key, body).await?;
        self.objects_written += 1;

        process_info!(
            ProcessId::current(),
            "📦 Wrote {} live urls to {}/{}",
            urls.len(),
            path.bucket,
            key
        );
        Ok(key)
    }
}
