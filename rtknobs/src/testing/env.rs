//! In-memory environments for exercising the resolver and cache.

use crate::config::EnvSource;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

/// A mutable environment backed by a map.
#[derive(Debug, Default)]
pub struct MapEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl MapEnv {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            vars: RwLock::new(vars),
        }
    }

    pub fn set(&self, name: &str, value: &str) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove(&self, name: &str) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

/// Wraps an environment and counts lookups per variable name.
#[derive(Debug, Default)]
pub struct CountingEnv<E> {
    inner: E,
    lookups: Mutex<HashMap<String, usize>>,
}

impl<E> CountingEnv<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            lookups: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Number of times `name` was looked up.
    pub fn lookups(&self, name: &str) -> usize {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_lookups(&self) -> usize {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

impl<E: EnvSource> EnvSource for CountingEnv<E> {
    fn var(&self, name: &str) -> Option<String> {
        *self
            .lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert(0) += 1;
        self.inner.var(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_env_set_and_remove() {
        let env = MapEnv::from_pairs([("A", "1")]);
        assert_eq!(env.var("A").as_deref(), Some("1"));

        env.set("A", "2");
        assert_eq!(env.var("A").as_deref(), Some("2"));

        env.remove("A");
        assert_eq!(env.var("A"), None);
    }

    #[test]
    fn test_counting_env_counts_misses() {
        let env = CountingEnv::new(MapEnv::default());
        assert_eq!(env.var("A"), None);
        assert_eq!(env.var("A"), None);
        assert_eq!(env.var("B"), None);

        assert_eq!(env.lookups("A"), 2);
        assert_eq!(env.lookups("B"), 1);
        assert_eq!(env.lookups("C"), 0);
        assert_eq!(env.total_lookups(), 3);
    }
}
