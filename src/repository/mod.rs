//! Repository module - identity-map storage for models.
//!
//! This module provides a registry-based identity map: every model type
//! gets its own named repository holding one shared instance per identifier.
//!
//! ## Architecture
//!
//! - `ModelRegistry` - Central registry holding all named repositories
//! - `Repository` - Typed map from stringified identifier to `Arc<M>`
//! - `ModelKey` / `RepositoryName` - Key and name types
//!
//! ## Usage
//!
//! ```rust,ignore
//! let authors = registry.repository::<Author>(&"Author".into())?;
//!
//! authors.register(Arc::new(author));
//! let author = authors.get("someone@example.com");
//! ```

mod error;
pub(crate) mod in_flight;
mod key;
mod registry;
mod store;

pub use error::RegistryError;
pub use key::{ModelKey, RepositoryName};
pub use registry::ModelRegistry;
pub use store::Repository;
