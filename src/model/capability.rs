//! Repository capability for model types.

use std::sync::Arc;

use super::{AutoRetriever, Model};
use crate::repository::{ModelRegistry, RegistryError, Repository, RepositoryName};

/// A model type cached in its own named repository.
///
/// ## Example
///
/// ```rust,ignore
/// impl RepositoryBacked for Author {
///     const REPOSITORY_NAME: &'static str = "Author";
///
///     fn as_auto_retriever(&self) -> Option<&dyn AutoRetriever<Self>> {
///         Some(self)
///     }
/// }
/// ```
pub trait RepositoryBacked: Model {
    /// Name of the repository holding this type's instances.
    const REPOSITORY_NAME: &'static str;

    fn repository_name() -> RepositoryName {
        RepositoryName::new(Self::REPOSITORY_NAME)
    }

    /// This type's repository in `registry`.
    fn repository_in(registry: &ModelRegistry) -> Result<Repository<Self>, RegistryError> {
        registry.repository::<Self>(&Self::repository_name())
    }

    /// This type's repository in the current registry.
    fn repository() -> Result<Repository<Self>, RegistryError> {
        Self::repository_in(&ModelRegistry::current())
    }

    /// Auto-retrieval capability of this type, if it has one.
    fn as_auto_retriever(&self) -> Option<&dyn AutoRetriever<Self>> {
        None
    }
}

/// Instance-level repository access for shared models.
pub trait RepositoryBackedExt<M: RepositoryBacked> {
    fn model_repository_name(&self) -> RepositoryName;

    fn model_repository(&self) -> Result<Repository<M>, RegistryError>;

    /// Register this instance in its repository in the current registry.
    fn store(&self) -> Result<(), RegistryError>;

    /// Register this instance in its repository in `registry`.
    fn store_in(&self, registry: &ModelRegistry) -> Result<(), RegistryError>;
}

impl<M: RepositoryBacked> RepositoryBackedExt<M> for Arc<M> {
    fn model_repository_name(&self) -> RepositoryName {
        M::repository_name()
    }

    fn model_repository(&self) -> Result<Repository<M>, RegistryError> {
        M::repository()
    }

    fn store(&self) -> Result<(), RegistryError> {
        M::repository()?.register(Arc::clone(self));
        Ok(())
    }

    fn store_in(&self, registry: &ModelRegistry) -> Result<(), RegistryError> {
        M::repository_in(registry)?.register(Arc::clone(self));
        Ok(())
    }
}
