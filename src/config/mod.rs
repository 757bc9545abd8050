//! Registry configuration.
//!
//! Loads configuration from environment variables, falling back to defaults.

use std::env;

use tracing::warn;

/// Largest initial capacity accepted; larger values are clamped.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 16;

/// Configuration applied to every repository a registry creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Initial capacity of each repository's map.
    pub initial_capacity: usize,

    /// Serialize concurrent retrievals of the same key so the retriever
    /// runs once while a retrieval is in flight.
    pub coalesce_retrievals: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            coalesce_retrievals: true,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `MODEL_REPOSITORY_INITIAL_CAPACITY` and `MODEL_REPOSITORY_COALESCE`.
    /// Unset or unparsable values keep their default. `.env` files are not
    /// loaded here; binaries call `dotenvy::dotenv()` themselves.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let initial_capacity = env::var("MODEL_REPOSITORY_INITIAL_CAPACITY")
            .ok()
            .and_then(|s| parse_capacity(&s))
            .unwrap_or(defaults.initial_capacity);

        let coalesce_retrievals = env::var("MODEL_REPOSITORY_COALESCE")
            .ok()
            .and_then(|s| parse_flag(&s))
            .unwrap_or(defaults.coalesce_retrievals);

        Self {
            initial_capacity,
            coalesce_retrievals,
        }
    }

    /// Set initial repository capacity (builder pattern).
    /// Clamped to [`MAX_INITIAL_CAPACITY`].
    #[must_use]
    pub fn initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = clamp_capacity(initial_capacity);
        self
    }

    /// Enable or disable retrieval coalescing.
    #[must_use]
    pub fn coalesce_retrievals(mut self, enabled: bool) -> Self {
        self.coalesce_retrievals = enabled;
        self
    }
}

fn parse_capacity(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().map(clamp_capacity)
}

fn clamp_capacity(capacity: usize) -> usize {
    if capacity > MAX_INITIAL_CAPACITY {
        warn!(
            requested = capacity,
            max = MAX_INITIAL_CAPACITY,
            "Initial repository capacity clamped"
        );
        return MAX_INITIAL_CAPACITY;
    }
    capacity
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = RegistryConfig::default()
            .initial_capacity(8)
            .coalesce_retrievals(false);

        assert_eq!(config.initial_capacity, 8);
        assert!(!config.coalesce_retrievals);
    }

    #[test]
    fn test_oversized_capacity_is_clamped() {
        assert_eq!(parse_capacity("128"), Some(128));
        assert_eq!(parse_capacity("1000000000"), Some(MAX_INITIAL_CAPACITY));
        assert_eq!(parse_capacity("lots"), None);

        let config = RegistryConfig::default().initial_capacity(usize::MAX);
        assert_eq!(config.initial_capacity, MAX_INITIAL_CAPACITY);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
