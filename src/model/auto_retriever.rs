use async_trait::async_trait;

use super::Model;

/// Produces a model for an identifier no cache entry or retriever could
/// resolve, e.g. a placeholder record or a remote fetch.
///
/// Expose it from [`super::RepositoryBacked::as_auto_retriever`] so lookups
/// can find it.
#[async_trait]
pub trait AutoRetriever<M: Model>: Send + Sync {
    async fn auto_retrieve(&self, identifier: M::Id) -> anyhow::Result<M>;
}
