//! Concurrent check of which versions contain tasks matching a filter.
//!
//! Versions are handed out to a fixed pool of workers through a shared
//! cursor. Each worker keeps its own result slots, merged once every worker
//! has joined. The first store error cancels the shared token, which stops
//! in-flight queries and any version not yet picked up.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use rollcall_core::{MatchingTasksOptions, Version, VersionId};

use crate::error::{EngineError, Result};
use crate::store::Store;

/// Determine, per version, whether at least one of its tasks matches `filter`.
///
/// At most `limit` store queries are in flight at once. On success the map holds every distinct input
/// version id exactly once. On failure no partial map is returned.
pub async fn match_versions(
    store: Arc<dyn Store>,
    versions: &[Version],
    filter: &MatchingTasksOptions,
    limit: NonZeroUsize,
    cancel: &CancellationToken,
) -> Result<HashMap<VersionId, bool>> {
    filter.validate()?;

    let mut seen = HashSet::with_capacity(versions.len());
    let versions: Arc<[Version]> = versions
        .iter()
        .filter(|v| seen.insert(v.id.clone()))
        .cloned()
        .collect();
    if versions.is_empty() {
        return Ok(HashMap::new());
    }

    let workers = limit.get().min(versions.len());
    let token = cancel.child_token();
    let cursor = Arc::new(AtomicUsize::new(0));
    let filter = Arc::new(filter.clone());

    let mut set = JoinSet::new();
    for worker in 0..workers {
        set.spawn(run_worker(
            worker,
            store.clone(),
            versions.clone(),
            filter.clone(),
            cursor.clone(),
            token.clone(),
        ));
    }

    let mut matches = HashMap::with_capacity(versions.len());
    let mut first_error = None;
    while let Some(joined) = set.join_next().await {
        let outcome = joined
            .map_err(|e| EngineError::Worker(e.to_string()))
            .and_then(|slots| slots);
        match outcome {
            Ok(slots) => matches.extend(slots),
            Err(err) => {
                if first_error.is_none() {
                    warn!(error = %err, "Version check failed, cancelling remaining checks");
                    token.cancel();
                    first_error = Some(err);
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    if matches.len() < versions.len() {
        return Err(EngineError::Cancelled);
    }

    info!(
        versions = versions.len(),
        matching = matches.values().filter(|m| **m).count(),
        workers,
        "Matched versions against task filter"
    );
    Ok(matches)
}

async fn run_worker(
    worker: usize,
    store: Arc<dyn Store>,
    versions: Arc<[Version]>,
    filter: Arc<MatchingTasksOptions>,
    cursor: Arc<AtomicUsize>,
    token: CancellationToken,
) -> Result<Vec<(VersionId, bool)>> {
    let mut slots = Vec::new();
    while !token.is_cancelled() {
        let index = cursor.fetch_add(1, Ordering::Relaxed);
        let Some(version) = versions.get(index) else {
            break;
        };

        let checked = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            checked = has_matching_tasks(&*store, version, &filter) => checked,
        };

        match checked {
            Ok(matched) => {
                debug!(worker, version_id = %version.id, matched, "Checked version");
                slots.push((version.id.clone(), matched));
            }
            Err(err) => {
                token.cancel();
                return Err(err);
            }
        }
    }
    Ok(slots)
}

/// Check a single version.
///
/// Versions that were never activated match nothing unless the filter opts
/// in, and are skipped without a store query.
pub async fn has_matching_tasks(
    store: &dyn Store,
    version: &Version,
    filter: &MatchingTasksOptions,
) -> Result<bool> {
    if !filter.include_never_activated_tasks && !version.is_activated() {
        return Ok(false);
    }
    let tasks = store.find_tasks_by_version(&version.id, filter).await?;
    Ok(tasks
        .iter()
        .any(|t| t.version == version.id && filter.matches(t)))
}
