//! Model traits.
//!
//! A [`Model`] is any serde type with an identifier. Implementing
//! [`RepositoryBacked`] gives it a named repository, and [`AutoRetriever`]
//! lets it synthesize instances nothing else can provide.

mod auto_retriever;
mod capability;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::ModelKey;

pub use auto_retriever::AutoRetriever;
pub use capability::{RepositoryBacked, RepositoryBackedExt};

/// A domain entity that serde can (de)serialize and that carries an identifier.
///
/// `Default` is required so lookups can build a throwaway instance when checking
/// for auto-retrieval.
pub trait Model: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Identifier type. Its `Display` output is the repository key.
    type Id: fmt::Display + Clone + Send + Sync + 'static;

    /// The identifier, if set.
    fn identifier(&self) -> Option<&Self::Id>;

    /// Repository key of this model; [`ModelKey::UNSET`] without identifier.
    fn model_key(&self) -> ModelKey {
        self.identifier()
            .map(ModelKey::from_identifier)
            .unwrap_or_else(ModelKey::unset)
    }
}
