//! Engine configuration.

use std::num::NonZeroUsize;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on concurrent per-version store queries in the matcher.
    pub max_concurrent_queries: Limit,
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Builder method to override the query limit.
    pub fn with_max_concurrent_queries(mut self, limit: Limit) -> Self {
        self.max_concurrent_queries = limit;
        self
    }
}

/// A bound on concurrent store queries.
///
/// Deserializes from `"default"` or a positive integer. There is no
/// unbounded setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Limit {
    /// At most this many.
    Max(NonZeroUsize),

    /// One per available processing unit.
    #[default]
    Default,
}

impl Limit {
    /// Resolve to a concrete bound.
    pub fn resolve(self) -> NonZeroUsize {
        match self {
            Limit::Max(max) => max,
            Limit::Default => {
                std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
            }
        }
    }
}

impl From<NonZeroUsize> for Limit {
    fn from(value: NonZeroUsize) -> Self {
        Limit::Max(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Count(usize),
    Named(String),
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match LimitRepr::deserialize(deserializer)? {
            LimitRepr::Count(n) => NonZeroUsize::new(n)
                .map(Limit::Max)
                .ok_or_else(|| D::Error::custom("limit must be a positive integer")),
            LimitRepr::Named(name) => match name.as_str() {
                "default" => Ok(Limit::Default),
                other => Err(D::Error::custom(format!("invalid limit '{other}'"))),
            },
        }
    }
}
