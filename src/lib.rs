//! Model Repository - identity maps for serde models.
//!
//! Keeps one shared instance per identifier for each model type, so that
//! every payload referencing the same entity resolves to the same `Arc`.
//!
//! ## Architecture
//!
//! - `config` - Registry configuration from the environment
//! - `repository` - Registry and per-type repositories
//! - `model` - `Model`, `RepositoryBacked` and `AutoRetriever` traits
//! - `find` - Lookup with retriever and auto-retriever fallbacks
//! - `reference` - Deduplicating serde helpers for embedded models

pub mod config;
pub mod find;
pub mod model;
pub mod reference;
pub mod repository;

pub use config::RegistryConfig;
pub use find::{find, find_with};
pub use model::{AutoRetriever, Model, RepositoryBacked, RepositoryBackedExt};
pub use reference::ModelReference;
pub use repository::{ModelKey, ModelRegistry, RegistryError, Repository, RepositoryName};
