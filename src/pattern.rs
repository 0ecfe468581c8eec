use crate::errors::ServiceError;
use lru::LruCache;
use regex::{Regex, RegexBuilder};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// LRU cache of compiled regexes keyed by pattern and case sensitivity.
///
/// Only compiled patterns are cached; file content is fetched fresh on every call.
#[derive(Clone)]
pub struct RegexCache {
    cache: Arc<Mutex<LruCache<(String, bool), Regex>>>,
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::new(256)
    }
}

impl RegexCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn get_or_compile(&self, pattern: &str, case_sensitive: bool) -> Result<Regex, ServiceError> {
        let key = (pattern.to_string(), case_sensitive);

        if let Ok(mut cache) = self.cache.lock()
            && let Some(regex) = cache.get(&key)
        {
            return Ok(regex.clone());
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()?;

        // Ignore a poisoned lock; the pattern is still usable
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, regex.clone());
        }

        Ok(regex)
    }

    /// Returns (entries, capacity)
    #[cfg(test)]
    pub fn stats(&self) -> (usize, usize) {
        if let Ok(cache) = self.cache.lock() {
            (cache.len(), cache.cap().get())
        } else {
            (0, 0)
        }
    }
}
