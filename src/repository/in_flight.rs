//! Per-key guards for retrievals in progress.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::ModelKey;

tokio::task_local! {
    /// `(repository id, key)` pairs whose retrieval this task is running.
    static HELD: HashSet<(usize, ModelKey)>;
}

/// Whether the current task is already retrieving `key` in `repository`.
pub(crate) fn is_held(repository: usize, key: &ModelKey) -> bool {
    HELD.try_with(|held| held.contains(&(repository, key.clone())))
        .unwrap_or(false)
}

/// Run `future` with `key` marked as held by the current task, so nested
/// lookups for the same key skip the lock instead of waiting on themselves.
pub(crate) async fn holding<F: Future>(repository: usize, key: ModelKey, future: F) -> F::Output {
    let mut held = HELD.try_with(HashSet::clone).unwrap_or_default();
    held.insert((repository, key));
    HELD.scope(held, future).await
}

/// Async locks keyed by model key, created on demand and dropped once
/// nobody holds or waits on them.
#[derive(Clone, Default)]
pub(crate) struct InFlightGuards {
    locks: Arc<DashMap<ModelKey, Arc<Mutex<()>>>>,
}

impl InFlightGuards {
    /// Wait until no other retrieval for `key` is running, then hold the key.
    pub(crate) async fn acquire(&self, key: &ModelKey) -> InFlightPermit {
        let lock = Arc::clone(&self.locks.entry(key.clone()).or_default());
        let guard = lock.lock_owned().await;

        InFlightPermit {
            locks: Arc::clone(&self.locks),
            key: key.clone(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Held while a retrieval for one key runs.
pub(crate) struct InFlightPermit {
    locks: Arc<DashMap<ModelKey, Arc<Mutex<()>>>>,
    key: ModelKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        // Release first so the map holds the only reference when idle.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
