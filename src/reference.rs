//! Deduplicating (de)serialization of embedded models.
//!
//! Use on fields holding repository-backed models so that every payload
//! mentioning the same identifier resolves to one shared instance:
//!
//! ```rust,ignore
//! #[derive(Serialize, Deserialize)]
//! struct Article {
//!     #[serde(with = "model_repository::reference")]
//!     author: Arc<Author>,
//!     #[serde(with = "model_repository::reference::vec", default)]
//!     reviewers: Vec<Arc<Author>>,
//! }
//! ```
//!
//! The first deserialized instance for an identifier becomes canonical. Later
//! payloads for that identifier are parsed and then dropped, even when their
//! fields differ. Serialization writes the model as-is.
//!
//! The field helpers resolve against [`ModelRegistry::current`]; use
//! [`ModelReference`] as a seed to target a registry explicitly.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::{DeserializeSeed, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::RepositoryBacked;
use crate::repository::{ModelRegistry, RegistryError};

/// Reconciles deserialized `M` candidates with `M`'s repository.
pub struct ModelReference<M> {
    registry: ModelRegistry,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for ModelReference<M> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: RepositoryBacked> ModelReference<M> {
    pub fn new(registry: &ModelRegistry) -> Self {
        Self {
            registry: registry.clone(),
            _model: PhantomData,
        }
    }

    /// Bound to [`ModelRegistry::current`].
    pub fn current() -> Self {
        Self::new(&ModelRegistry::current())
    }

    /// The registered instance for `candidate`'s key, or `candidate` itself
    /// after registering it.
    pub fn resolve(&self, candidate: M) -> Result<Arc<M>, RegistryError> {
        let repository = M::repository_in(&self.registry)?;
        Ok(repository.get_or_register(Arc::new(candidate)))
    }
}

impl<M> fmt::Debug for ModelReference<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelReference")
            .field("model", &std::any::type_name::<M>())
            .finish()
    }
}

impl<'de, M: RepositoryBacked> DeserializeSeed<'de> for ModelReference<M> {
    type Value = Arc<M>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let candidate = M::deserialize(deserializer)?;
        self.resolve(candidate).map_err(D::Error::custom)
    }
}

pub fn serialize<M, S>(model: &Arc<M>, serializer: S) -> Result<S::Ok, S::Error>
where
    M: RepositoryBacked,
    S: Serializer,
{
    model.as_ref().serialize(serializer)
}

pub fn deserialize<'de, M, D>(deserializer: D) -> Result<Arc<M>, D::Error>
where
    M: RepositoryBacked,
    D: Deserializer<'de>,
{
    ModelReference::<M>::current().deserialize(deserializer)
}

/// For `Option<Arc<M>>` fields.
pub mod option {
    use super::*;

    pub fn serialize<M, S>(model: &Option<Arc<M>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        M: RepositoryBacked,
        S: Serializer,
    {
        model.as_deref().serialize(serializer)
    }

    pub fn deserialize<'de, M, D>(deserializer: D) -> Result<Option<Arc<M>>, D::Error>
    where
        M: RepositoryBacked,
        D: Deserializer<'de>,
    {
        let Some(candidate) = Option::<M>::deserialize(deserializer)? else {
            return Ok(None);
        };

        ModelReference::<M>::current()
            .resolve(candidate)
            .map(Some)
            .map_err(D::Error::custom)
    }
}

/// For `Vec<Arc<M>>` fields.
pub mod vec {
    use super::*;

    #[allow(clippy::ptr_arg)]
    pub fn serialize<M, S>(models: &Vec<Arc<M>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        M: RepositoryBacked,
        S: Serializer,
    {
        serializer.collect_seq(models.iter().map(Arc::as_ref))
    }

    pub fn deserialize<'de, M, D>(deserializer: D) -> Result<Vec<Arc<M>>, D::Error>
    where
        M: RepositoryBacked,
        D: Deserializer<'de>,
    {
        let candidates = Vec::<M>::deserialize(deserializer)?;
        let reference = ModelReference::<M>::current();

        candidates
            .into_iter()
            .map(|candidate| reference.resolve(candidate).map_err(D::Error::custom))
            .collect()
    }
}
