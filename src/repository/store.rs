//! Identity-map repository for one model type.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use super::in_flight::InFlightGuards;
use super::{ModelKey, RepositoryName};
use crate::config::RegistryConfig;
use crate::model::Model;

/// Holds at most one canonical instance per identifier of a model type.
///
/// This repository is:
/// - Thread-safe (entries live in a shared `DashMap`)
/// - Never evicting (an entry stays until overwritten)
/// - Clone-friendly (cloning is cheap, shares the same underlying map)
pub struct Repository<M: Model> {
    name: RepositoryName,
    models: Arc<DashMap<ModelKey, Arc<M>>>,
    in_flight: InFlightGuards,
    coalesce: bool,
}

// Manual Clone implementation that doesn't require M: Clone
impl<M: Model> Clone for Repository<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            models: Arc::clone(&self.models),
            in_flight: self.in_flight.clone(),
            coalesce: self.coalesce,
        }
    }
}

impl<M: Model> Repository<M> {
    /// Create an empty repository with default configuration.
    pub fn new(name: impl Into<RepositoryName>) -> Self {
        Self::with_config(name, &RegistryConfig::default())
    }

    /// Create an empty repository with the given configuration.
    pub fn with_config(name: impl Into<RepositoryName>, config: &RegistryConfig) -> Self {
        Self {
            name: name.into(),
            models: Arc::new(DashMap::with_capacity(config.initial_capacity)),
            in_flight: InFlightGuards::default(),
            coalesce: config.coalesce_retrievals,
        }
    }

    /// Get the name of this repository.
    pub fn name(&self) -> &RepositoryName {
        &self.name
    }

    /// Register a model under its own key, replacing any previous entry.
    pub fn register(&self, model: Arc<M>) {
        let key = model.model_key();
        if key.is_unset() {
            warn!(
                repository = %self.name,
                "Registering model without identifier under sentinel key"
            );
        }

        debug!(repository = %self.name, key = %key, "Registering model");
        self.models.insert(key, model);
    }

    /// Get the model registered under `key`.
    pub fn get(&self, key: &str) -> Option<Arc<M>> {
        self.models.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Get the model registered for an identifier.
    pub fn get_by_id(&self, identifier: &M::Id) -> Option<Arc<M>> {
        self.get(ModelKey::from_identifier(identifier).as_str())
    }

    /// Return the instance already registered under the model's key, or
    /// register `model` and return it.
    ///
    /// The lookup and the insert happen under one shard lock, so two
    /// callers racing on the same key agree on a single canonical instance.
    pub fn get_or_register(&self, model: Arc<M>) -> Arc<M> {
        let key = model.model_key();

        match self.models.entry(key) {
            Entry::Occupied(entry) => {
                debug!(repository = %self.name, key = %entry.key(), "Reusing registered model");
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                if entry.key().is_unset() {
                    warn!(
                        repository = %self.name,
                        "Registering model without identifier under sentinel key"
                    );
                }
                debug!(repository = %self.name, key = %entry.key(), "Registering model");
                Arc::clone(entry.insert(model).value())
            }
        }
    }

    /// Check if a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.models.contains_key(key)
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// All registered keys, in no particular order.
    pub fn keys(&self) -> Vec<ModelKey> {
        self.models.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Identity of the underlying map, shared by all clones of this handle.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.models) as usize
    }

    pub(crate) fn in_flight(&self) -> &InFlightGuards {
        &self.in_flight
    }

    pub(crate) fn coalesces(&self) -> bool {
        self.coalesce
    }
}

impl<M: Model> std::fmt::Debug for Repository<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.name)
            .field("model", &std::any::type_name::<M>())
            .field("len", &self.models.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::A;

    fn a(id: Option<u32>, foo: &str) -> Arc<A> {
        Arc::new(A {
            id,
            foo: Some(foo.to_string()),
        })
    }

    #[test]
    fn test_register_then_get_returns_same_instance() {
        let repository = Repository::<A>::new("A");
        let model = a(Some(1), "one");

        repository.register(Arc::clone(&model));

        let found = repository.get("1").unwrap();
        assert!(Arc::ptr_eq(&found, &model));
        assert!(Arc::ptr_eq(&repository.get_by_id(&1).unwrap(), &model));
    }

    #[test]
    fn test_register_overwrites_same_key() {
        let repository = Repository::<A>::new("A");
        let first = a(Some(1), "first");
        let second = a(Some(1), "second");

        repository.register(Arc::clone(&first));
        repository.register(Arc::clone(&second));

        let found = repository.get("1").unwrap();
        assert!(Arc::ptr_eq(&found, &second));
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_miss_returns_none() {
        let repository = Repository::<A>::new("A");

        assert!(repository.get("missing").is_none());
        assert!(!repository.contains("missing"));
        assert!(repository.is_empty());
    }

    #[test]
    fn test_get_or_register_keeps_first_instance() {
        let repository = Repository::<A>::new("A");
        let first = a(Some(3), "first");
        let second = a(Some(3), "second");

        let canonical = repository.get_or_register(Arc::clone(&first));
        assert!(Arc::ptr_eq(&canonical, &first));

        let canonical = repository.get_or_register(second);
        assert!(Arc::ptr_eq(&canonical, &first));
        assert_eq!(canonical.foo.as_deref(), Some("first"));
    }

    #[test]
    fn test_models_without_identifier_collide_on_sentinel() {
        let repository = Repository::<A>::new("A");
        let first = a(None, "first");
        let second = a(None, "second");

        repository.register(first);
        repository.register(Arc::clone(&second));

        assert_eq!(repository.keys(), vec![ModelKey::unset()]);
        assert!(Arc::ptr_eq(&repository.get(ModelKey::UNSET).unwrap(), &second));
    }

    #[test]
    fn test_clones_share_entries() {
        let repository = Repository::<A>::new("A");
        let handle = repository.clone();

        handle.register(a(Some(9), "shared"));

        assert!(repository.contains("9"));
    }
}
