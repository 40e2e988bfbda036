//! Per-event key/value storage.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Reserved key: name of the plugin whose matcher is currently handling the
/// event. Written by the router before each matcher invocation.
pub const PLUGIN_NAME: &str = "plugin_name";

/// String-keyed map of arbitrary values attached to one [`Context`].
///
/// Safe for concurrent readers; writes take the lock exclusively. Within one
/// event a single-writer discipline is the norm, but nothing breaks if two
/// handlers race on distinct keys.
///
/// [`Context`]: crate::context::Context
#[derive(Default)]
pub struct Storage {
    data: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn set<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) {
        self.data.write().insert(key.into(), Arc::new(value));
    }

    /// Clone-out accessor; `None` when the key is absent or holds a
    /// different type.
    pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.data
            .read()
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get::<String>(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get::<i64>(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get::<bool>(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    pub fn remove(&self, key: &str) {
        self.data.write().remove(key);
    }

    pub fn clear(&self) {
        self.data.write().clear();
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_typed() {
        let storage = Storage::new();
        storage.set("count", 3i64);
        storage.set("name", String::from("ripple"));

        assert_eq!(storage.get_i64("count"), Some(3));
        assert_eq!(storage.get_string("name").as_deref(), Some("ripple"));
        // Wrong type reads as absent.
        assert_eq!(storage.get_bool("count"), None);
    }

    #[test]
    fn overwrite_and_remove() {
        let storage = Storage::new();
        storage.set("k", 1i64);
        storage.set("k", 2i64);
        assert_eq!(storage.get_i64("k"), Some(2));

        storage.remove("k");
        assert!(!storage.contains("k"));
        assert!(storage.is_empty());
    }
}
