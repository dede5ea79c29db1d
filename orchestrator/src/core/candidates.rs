//! Candidate URL generation and batching

use std::collections::HashSet;
use std::path::Path;

use crate::error::{OrchestratorError, OrchestratorResult};

/// Placeholders recognised in URL templates, first match wins
const PLACEHOLDERS: [&str; 2] = ["%s", "{}"];

/// Read fuzz terms, one per line; surrounding whitespace and blank lines are dropped
pub async fn load_fuzz_terms(path: &Path) -> OrchestratorResult<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        OrchestratorError::config(format!("cannot read fuzz terms file {}: {}", path.display(), e))
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect())
}

/// Substitute every term into the template
///
/// The result is deduplicated, keeping first-seen order, so no URL can be
/// dispatched twice within a run.
pub fn build_candidates(template: &str, terms: &[String]) -> OrchestratorResult<Vec<String>> {
    let placeholder = PLACEHOLDERS
        .iter()
        .find(|p| template.contains(*p))
        .ok_or_else(|| {
            OrchestratorError::config(format!(
                "url template '{template}' has no %s or {{}} placeholder"
            ))
        })?;

    let mut seen = HashSet::with_capacity(terms.len());
    Ok(terms
        .iter()
        .map(|term| template.replacen(placeholder, term, 1))
        .filter(|url| seen.insert(url.clone()))
        .collect())
}

/// Split URLs into batches of at most `batch_size`, preserving order
pub fn chunk_batches(urls: Vec<String>, batch_size: usize) -> Vec<Vec<String>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(urls.len().div_ceil(batch_size));
    let mut iter = urls.into_iter().peekable();

    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(batch_size).collect());
    }
    batches
}
