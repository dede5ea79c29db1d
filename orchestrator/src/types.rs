//! Orchestrator-side domain types

use std::fmt;
use std::str::FromStr;

use shared::WorkerIndex;
use crate::error::{OrchestratorError, OrchestratorResult};

/// Logical object-store location `{bucket}/{prefix}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath {
    pub bucket: String,
    pub prefix: String,
}

impl ObjectPath {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Prefix used to list the objects written under this path
    pub fn list_prefix(&self) -> String {
        if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.prefix)
        }
    }

    /// Key for a new object named `name` inside this path
    pub fn object_key(&self, name: &str) -> String {
        format!("{}{}", self.list_prefix(), name)
    }
}

impl FromStr for ObjectPath {
    type Err = OrchestratorError;

    /// Accepts `s3://bucket/prefix` or `bucket/prefix`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_scheme = trimmed.strip_prefix("s3://").unwrap_or(trimmed);
        let (bucket, prefix) = without_scheme.split_once('/').unwrap_or((without_scheme, ""));

        if bucket.is_empty() || bucket.contains(char::is_whitespace) {
            return Err(OrchestratorError::InvalidObjectPath { path: s.to_string() });
        }

        Ok(Self::new(bucket, prefix))
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "s3://{}", self.bucket)
        } else {
            write!(f, "s3://{}/{}", self.bucket, self.prefix)
        }
    }
}

/// One unit of work: a URL template and where its live URLs go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryTarget {
    pub url_template: String,
    pub output: ObjectPath,
}

impl DiscoveryTarget {
    pub fn new(url_template: impl Into<String>, output: ObjectPath) -> Self {
        Self {
            url_template: url_template.into(),
            output,
        }
    }

    /// Pair templates with output paths in order
    pub fn zip(templates: &[String], outputs: &[String]) -> OrchestratorResult<Vec<Self>> {
        if templates.len() != outputs.len() {
            return Err(OrchestratorError::config(format!(
                "{} url templates but {} output paths",
                templates.len(),
                outputs.len()
            )));
        }
        if templates.is_empty() {
            return Err(OrchestratorError::config("at least one url template is required"));
        }

        templates
            .iter()
            .zip(outputs)
            .map(|(template, output)| Ok(Self::new(template.clone(), output.parse()?)))
            .collect()
    }
}

/// Fixed pool of interchangeable workers `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    pub min: u32,
    pub max: u32,
}

impl WorkerPool {
    pub fn new(min: u32, max: u32) -> OrchestratorResult<Self> {
        if max <= min {
            return Err(OrchestratorError::config(format!(
                "worker pool [{min}, {max}) is empty"
            )));
        }
        Ok(Self { min, max })
    }

    /// Number of batches dispatched concurrently per rotation group
    pub fn width(&self) -> usize {
        (self.max - self.min) as usize
    }

    pub fn members(&self) -> impl Iterator<Item = WorkerIndex> {
        (self.min..self.max).map(WorkerIndex::new)
    }

    /// Worker for the batch at `slot` of rotation group `group_index`
    ///
    /// Every group spans the whole pool, so slot `i` always lands on
    /// worker `min + i`; the group index only fixes the global batch number.
    pub fn assign(&self, group_index: usize, slot: usize) -> WorkerIndex {
        let width = self.width();
        let batch_index = group_index * width + slot;
        WorkerIndex::new(self.min + (batch_index % width) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_parsing() {
        let path: ObjectPath = "s3://phish-results/weebly/run-1/".parse().unwrap();
        assert_eq!(path.bucket, "phish-results");
        assert_eq!(path.prefix, "weebly/run-1");
        assert_eq!(path.to_string(), "s3://phish-results/weebly/run-1");

        let bare: ObjectPath = "bucket".parse().unwrap();
        assert_eq!(bare.prefix, "");
        assert_eq!(bare.list_prefix(), "");
        assert_eq!(bare.object_key("abc"), "abc");

        assert!("s3://".parse::<ObjectPath>().is_err());
        assert!("/prefix-only".parse::<ObjectPath>().is_err());
    }

    #[test]
    fn test_object_keys_stay_inside_prefix() {
        let path = ObjectPath::new("b", "found/urls");
        assert_eq!(path.list_prefix(), "found/urls/");
        assert_eq!(path.object_key("1234"), "found/urls/1234");
    }

    #[test]
    fn test_targets_zip_in_order() {
        let templates = vec!["https://%s.a.test".to_string(), "https://%s.b.test".to_string()];
        let outputs = vec!["bucket/a".to_string(), "bucket/b".to_string()];

        let targets = DiscoveryTarget::zip(&templates, &outputs).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].url_template, "https://%s.b.test");
        assert_eq!(targets[1].output.prefix, "b");

        assert!(DiscoveryTarget::zip(&templates, &outputs[..1]).is_err());
        assert!(DiscoveryTarget::zip(&[], &[]).is_err());
    }

    #[test]
    fn test_worker_assignment_spans_pool() {
        let pool = WorkerPool::new(3, 6).unwrap();
        assert_eq!(pool.width(), 3);

        let group0: Vec<u32> = (0..3).map(|slot| pool.assign(0, slot).value()).collect();
        let group4: Vec<u32> = (0..3).map(|slot| pool.assign(4, slot).value()).collect();
        assert_eq!(group0, vec![3, 4, 5]);
        assert_eq!(group4, vec![3, 4, 5]);

        assert!(WorkerPool::new(5, 5).is_err());
        assert!(WorkerPool::new(6, 2).is_err());
    }
}
