//! Model registry - Central ownership of all repositories.

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::{RegistryError, Repository, RepositoryName};
use crate::config::RegistryConfig;
use crate::model::Model;

static GLOBAL: Lazy<ModelRegistry> =
    Lazy::new(|| ModelRegistry::with_config(RegistryConfig::from_env()));

thread_local! {
    static SCOPED: RefCell<Option<ModelRegistry>> = const { RefCell::new(None) };
}

tokio::task_local! {
    static TASK_SCOPED: ModelRegistry;
}

/// Central registry owning one repository per repository name.
///
/// Repositories are created lazily on first access and live as long as the
/// registry. Cloning a registry is cheap; clones share the same repositories.
///
/// ## Example
///
/// ```rust,ignore
/// let registry = ModelRegistry::new();
///
/// // First access creates the repository
/// let authors: Repository<Author> = registry.repository(&"Author".into())?;
///
/// // Later accesses return the same store
/// let same: Repository<Author> = registry.repository(&"Author".into())?;
/// ```
#[derive(Clone)]
pub struct ModelRegistry {
    repositories: Arc<RwLock<HashMap<RepositoryName, RepositoryEntry>>>,
    config: RegistryConfig,
}

/// Internal entry storing a type-erased repository.
struct RepositoryEntry {
    repository: Box<dyn Any + Send + Sync>,
    model_type: &'static str,
}

impl ModelRegistry {
    /// Create a new empty registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new empty registry with the given configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        info!(
            coalesce_retrievals = config.coalesce_retrievals,
            "Model registry initialized"
        );
        Self {
            repositories: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// The process-wide default registry, built from the environment on
    /// first use.
    pub fn global() -> &'static ModelRegistry {
        &GLOBAL
    }

    /// The registry installed by the innermost [`ModelRegistry::in_scope`]
    /// on this thread, else the one installed by [`ModelRegistry::scope`]
    /// on this task, else the global registry.
    pub fn current() -> ModelRegistry {
        SCOPED
            .with(|scoped| scoped.borrow().clone())
            .or_else(|| TASK_SCOPED.try_with(ModelRegistry::clone).ok())
            .unwrap_or_else(|| ModelRegistry::clone(&GLOBAL))
    }

    /// Run `future` with this registry as [`ModelRegistry::current`] on
    /// every poll, across awaits.
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        TASK_SCOPED.scope(self.clone(), future).await
    }

    /// Run `f` with this registry as [`ModelRegistry::current`].
    ///
    /// Derived serde impls using [`crate::reference`] resolve against the
    /// current registry, so wrap deserialization calls in this to target an
    /// explicit registry. The scope covers synchronous code only; use
    /// [`ModelRegistry::scope`] for futures.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        let previous = SCOPED.with(|scoped| scoped.replace(Some(self.clone())));
        let _restore = ScopeRestore(previous);
        f()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Get the repository for `name`, creating it if it doesn't exist.
    ///
    /// Fails if `name` was first created for a different model type.
    pub fn repository<M: Model>(&self, name: &RepositoryName) -> Result<Repository<M>, RegistryError> {
        if let Some(repository) = self.get(name.as_str())? {
            return Ok(repository);
        }

        let mut repositories = self.repositories.write();

        // Another caller may have created it between the two locks
        if let Some(existing) = repositories.get(name) {
            return Self::downcast(name.as_str(), existing);
        }

        debug!("Creating repository: {}", name);
        let repository = Repository::<M>::with_config(name.clone(), &self.config);

        repositories.insert(
            name.clone(),
            RepositoryEntry {
                repository: Box::new(repository.clone()),
                model_type: type_name::<M>(),
            },
        );

        Ok(repository)
    }

    /// Get an existing repository by name.
    ///
    /// Returns `Ok(None)` if no repository was created under `name` yet.
    pub fn get<M: Model>(&self, name: &str) -> Result<Option<Repository<M>>, RegistryError> {
        let repositories = self.repositories.read();

        repositories
            .get(name)
            .map(|entry| Self::downcast(name, entry))
            .transpose()
    }

    fn downcast<M: Model>(name: &str, entry: &RepositoryEntry) -> Result<Repository<M>, RegistryError> {
        entry
            .repository
            .downcast_ref::<Repository<M>>()
            .cloned()
            .ok_or_else(|| RegistryError::type_mismatch(name, type_name::<M>(), entry.model_type))
    }

    /// Check if a repository with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.repositories.read().contains_key(name)
    }

    /// Get the number of repositories.
    pub fn len(&self) -> usize {
        self.repositories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.read().is_empty()
    }

    /// Get a list of all repository names.
    pub fn repository_names(&self) -> Vec<RepositoryName> {
        self.repositories.read().keys().cloned().collect()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let repositories = self.repositories.read();
        f.debug_struct("ModelRegistry")
            .field("repository_count", &repositories.len())
            .field("repository_names", &repositories.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

/// Puts back the previously scoped registry, even on unwind.
struct ScopeRestore(Option<ModelRegistry>);

impl Drop for ScopeRestore {
    fn drop(&mut self) {
        let previous = self.0.take();
        SCOPED.with(|scoped| *scoped.borrow_mut() = previous);
    }
}
