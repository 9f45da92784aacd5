// Session — an explicit key-value attribute store standing in for the
// browser session.
//
// Redirect round trips to external providers are separate stateless HTTP
// requests; the session is the only continuity mechanism between them, so
// it is modeled as a first-class object passed into operations, never as
// hidden global state. Clones share the same backing map. All mutation
// goes through a single per-session lock, so concurrent requests against
// the same session (two tabs racing) cannot lose updates.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type AttrMap = HashMap<String, Box<dyn Any + Send + Sync>>;

/// A shareable session attribute store.
#[derive(Debug, Clone, Default)]
pub struct Session {
    attrs: Arc<Mutex<AttrMap>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            attrs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AttrMap> {
        self.attrs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the attribute under `key`, if present and of type `T`.
    pub fn get<T: Any + Send + Sync + Clone>(&self, key: &str) -> Option<T> {
        let attrs = self.lock();
        attrs.get(key).and_then(|v| v.downcast_ref::<T>()).cloned()
    }

    /// Set the attribute under `key`, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&self, key: &str, value: T) {
        let mut attrs = self.lock();
        attrs.insert(key.to_string(), Box::new(value));
    }

    /// Remove the attribute under `key`. Returns whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        let mut attrs = self.lock();
        attrs.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Atomic read-modify-write against the attribute under `key`,
    /// inserting `T::default()` if it is absent (or of another type).
    /// The closure runs under the session lock.
    pub fn update<T, R>(&self, key: &str, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Any + Send + Sync + Default,
    {
        let mut attrs = self.lock();
        let entry = attrs
            .entry(key.to_string())
            .or_insert_with(|| Box::new(T::default()));
        if entry.downcast_mut::<T>().is_none() {
            *entry = Box::new(T::default());
        }
        // Downcast cannot fail after the reset above.
        let value = entry
            .downcast_mut::<T>()
            .expect("attribute type reset to T");
        f(value)
    }

    /// Atomic read-modify-write that does NOT create the attribute: the
    /// closure sees `None` when it is absent. Used by operations that must
    /// not lazily materialize state (remove, list, clear).
    pub fn modify<T, R>(&self, key: &str, f: impl FnOnce(Option<&mut T>) -> R) -> R
    where
        T: Any + Send + Sync,
    {
        let mut attrs = self.lock();
        let value = attrs.get_mut(key).and_then(|v| v.downcast_mut::<T>());
        f(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let session = Session::new();
        assert!(session.get::<String>("name").is_none());

        session.set("name", "joe".to_string());
        assert_eq!(session.get::<String>("name").unwrap(), "joe");
        assert!(session.contains("name"));

        assert!(session.remove("name"));
        assert!(!session.remove("name"));
        assert!(!session.contains("name"));
    }

    #[test]
    fn test_clone_shares_attributes() {
        let session = Session::new();
        let other = session.clone();
        session.set("n", 7u32);
        assert_eq!(other.get::<u32>("n").unwrap(), 7);
    }

    #[test]
    fn test_update_inserts_default() {
        let session = Session::new();
        let len = session.update::<Vec<u32>, usize>("items", |items| {
            items.push(1);
            items.len()
        });
        assert_eq!(len, 1);
        assert_eq!(session.get::<Vec<u32>>("items").unwrap(), vec![1]);
    }

    #[test]
    fn test_update_resets_on_type_mismatch() {
        let session = Session::new();
        session.set("items", "not a vec".to_string());
        session.update::<Vec<u32>, ()>("items", |items| items.push(5));
        assert_eq!(session.get::<Vec<u32>>("items").unwrap(), vec![5]);
    }

    #[test]
    fn test_modify_does_not_create() {
        let session = Session::new();
        let seen = session.modify::<Vec<u32>, bool>("items", |items| items.is_some());
        assert!(!seen);
        assert!(!session.contains("items"));
    }

    #[test]
    fn test_wrong_type_get_is_none() {
        let session = Session::new();
        session.set("n", 1u32);
        assert!(session.get::<String>("n").is_none());
    }
}
