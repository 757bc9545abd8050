//! Model lookup with retrieval fallbacks.
//!
//! A lookup checks the repository first, then the caller's retriever, then
//! the model's auto-retriever. Whatever is obtained is registered before it
//! is returned, so the next lookup for the same identifier is a cache hit.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::model::RepositoryBacked;
use crate::repository::in_flight;
use crate::repository::{ModelKey, ModelRegistry};

impl ModelRegistry {
    /// Find a model by identifier, falling back to auto-retrieval.
    pub async fn find<M: RepositoryBacked>(&self, identifier: M::Id) -> Result<Option<Arc<M>>> {
        self.find_with::<M, _, _>(identifier, |_| async { Ok(None) })
            .await
    }

    /// Find a model by identifier, calling `retriever` on a cache miss and
    /// auto-retrieval if the retriever yields nothing.
    ///
    /// Returns `Ok(None)` when every source comes up empty. Retriever and
    /// auto-retriever errors are returned as-is and nothing is registered.
    pub async fn find_with<M, F, Fut>(&self, identifier: M::Id, retriever: F) -> Result<Option<Arc<M>>>
    where
        M: RepositoryBacked,
        F: FnOnce(M::Id) -> Fut,
        Fut: Future<Output = Result<Option<M>>>,
    {
        let repository = M::repository_in(self)?;
        let key = ModelKey::from_identifier(&identifier);

        if let Some(model) = repository.get(key.as_str()) {
            debug!(repository = %repository.name(), key = %key, "Cache hit");
            return Ok(Some(model));
        }

        // A retriever looking up its own key again must not wait on itself
        let reentrant = in_flight::is_held(repository.id(), &key);

        let _permit = if repository.coalesces() && !reentrant {
            let permit = repository.in_flight().acquire(&key).await;
            // Someone may have registered it while we waited
            if let Some(model) = repository.get(key.as_str()) {
                debug!(repository = %repository.name(), key = %key, "Cache hit after wait");
                return Ok(Some(model));
            }
            Some(permit)
        } else {
            None
        };

        debug!(repository = %repository.name(), key = %key, "Cache miss, retrieving");

        let retrieval = async move {
            match retriever(identifier.clone()).await? {
                Some(model) => Ok(Some(model)),
                None => auto_retrieve::<M>(identifier).await,
            }
        };

        // Nested lookups and reference fields inside the retrievers resolve
        // against this registry
        let model = in_flight::holding(repository.id(), key.clone(), self.scope(retrieval)).await?;

        let Some(model) = model else {
            debug!(repository = %repository.name(), key = %key, "Model not found");
            return Ok(None);
        };

        let model = Arc::new(model);
        if model.model_key() != key {
            debug!(
                repository = %repository.name(),
                requested = %key,
                registered = %model.model_key(),
                "Retrieved model has a different identifier"
            );
        }
        repository.register(Arc::clone(&model));

        Ok(Some(model))
    }
}

/// Ask a default-built instance for its auto-retriever and run it.
async fn auto_retrieve<M: RepositoryBacked>(identifier: M::Id) -> Result<Option<M>> {
    let template = M::default();

    match template.as_auto_retriever() {
        Some(retriever) => Ok(Some(retriever.auto_retrieve(identifier).await?)),
        None => Ok(None),
    }
}

/// [`ModelRegistry::find`] on the current registry.
///
/// The registry is captured when this is called, not when it is awaited.
pub fn find<M: RepositoryBacked>(identifier: M::Id) -> impl Future<Output = Result<Option<Arc<M>>>> {
    let registry = ModelRegistry::current();
    async move { registry.find::<M>(identifier).await }
}

/// [`ModelRegistry::find_with`] on the current registry.
///
/// The registry is captured when this is called, not when it is awaited.
pub fn find_with<M, F, Fut>(identifier: M::Id, retriever: F) -> impl Future<Output = Result<Option<Arc<M>>>>
where
    M: RepositoryBacked,
    F: FnOnce(M::Id) -> Fut,
    Fut: Future<Output = Result<Option<M>>>,
{
    let registry = ModelRegistry::current();
    async move { registry.find_with::<M, F, Fut>(identifier, retriever).await }
}
