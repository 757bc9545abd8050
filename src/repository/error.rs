//! Registry errors.

use thiserror::Error;

/// Errors raised when resolving a repository from a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Repository '{name}' already holds {found}, requested as {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl RegistryError {
    pub fn type_mismatch(name: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected,
            found,
        }
    }
}
