//! Cache keys and repository names.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Stringified model identifier used as a repository key.
///
/// Two identifiers that stringify identically are the same key. Models
/// without an identifier all map to [`ModelKey::UNSET`], so registering
/// several of them keeps only the last one.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey(Arc<str>);

impl ModelKey {
    /// Sentinel key for models whose identifier is not set.
    pub const UNSET: &'static str = "undefined";

    /// Build a key from any displayable identifier.
    pub fn from_identifier<I: fmt::Display + ?Sized>(identifier: &I) -> Self {
        Self(identifier.to_string().into())
    }

    /// The sentinel key for identifier-less models.
    pub fn unset() -> Self {
        Self(Self::UNSET.into())
    }

    /// Whether this is the identifier-less sentinel.
    pub fn is_unset(&self) -> bool {
        &*self.0 == Self::UNSET
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModelKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ModelKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelKey {
    fn from(key: &str) -> Self {
        Self(key.into())
    }
}

impl From<String> for ModelKey {
    fn from(key: String) -> Self {
        Self(key.into())
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelKey({:?})", &*self.0)
    }
}

/// Name of a repository, one per model type.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryName(Arc<str>);

impl RepositoryName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RepositoryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RepositoryName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RepositoryName({:?})", &*self.0)
    }
}
