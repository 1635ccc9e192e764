//! Per-invocation lookup cache
//!
//! Some lookups (the current git branch, whether a tool is on `PATH`) are
//! needed more than once while a command runs. The cache computes each key
//! once and is dropped with the invocation that owns it.

use crate::Result;
use indexmap::IndexMap;
use indexmap::map::Entry;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cached {
    Text(String),
    Flag(bool),
}

/// Read-through, write-once memoisation keyed by string
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: IndexMap<String, Cached>,
}

impl LookupCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached text for `key`, computing it on first use
    ///
    /// A failed computation is not cached.
    pub fn text_or_try_insert_with<F>(&mut self, key: &str, compute: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                Cached::Text(text) => Ok(text.clone()),
                Cached::Flag(flag) => Ok(flag.to_string()),
            },
            Entry::Vacant(entry) => {
                let text = compute()?;
                tracing::debug!(key, value = %text, "Cached lookup");
                entry.insert(Cached::Text(text.clone()));
                Ok(text)
            }
        }
    }

    /// Cached flag for `key`, computing it on first use
    pub fn flag_or_insert_with<F>(&mut self, key: &str, compute: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => matches!(entry.get(), Cached::Flag(true)),
            Entry::Vacant(entry) => {
                let flag = compute();
                tracing::debug!(key, value = flag, "Cached lookup");
                entry.insert(Cached::Flag(flag));
                flag
            }
        }
    }

    /// Whether `key` has been computed
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
