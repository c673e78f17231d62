use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::topic;
use crate::value::{StateValue, SubscriptionId};

/// Callback type for state change notifications.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Per-path state store with pattern-matched change subscriptions.
///
/// - `set(path, value)` replaces the snapshot at a path and notifies subscribers.
/// - `get_as(path)` / `read(path, f)` read the current snapshot.
/// - `update(path, f)` is an atomic read-modify-write: concurrent updates of
///   the same path never interleave.
/// - `subscribe(pattern, handler)` registers a change handler.
///
/// Handlers run after the write lock is released, so a handler may read
/// the store (and sees the new value).
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: RwLock<Vec<HandlerEntry>>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    pattern: String,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn values_read(&self) -> RwLockReadGuard<'_, BTreeMap<String, StateValue>> {
        self.values.read().unwrap_or_else(|e| e.into_inner())
    }

    fn values_write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, StateValue>> {
        self.values.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the value at `path` and notify matching subscribers.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        let value = StateValue::new(value);
        self.values_write().insert(path.to_string(), value.clone());
        self.notify(path, &value);
    }

    /// Raw snapshot at `path`.
    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.values_read().get(path).cloned()
    }

    /// Cloned snapshot at `path`, if one of type `T` is stored.
    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.values_read().get(path).and_then(|v| v.cloned::<T>())
    }

    /// Borrow the snapshot at `path` as `T` for the duration of `f`.
    pub fn read<T: Any, R>(&self, path: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        let values = self.values_read();
        values.get(path).and_then(|v| v.downcast_ref::<T>()).map(f)
    }

    /// Atomically apply `f` to the value at `path`.
    ///
    /// Starts from `T::default()` if nothing (or a value of another type)
    /// is stored. The new snapshot is published before subscribers run.
    pub fn update<T, R>(&self, path: &str, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Any + Clone + Default + Send + Sync,
    {
        let (result, value) = {
            let mut values = self.values_write();
            let mut current: T = values
                .get(path)
                .and_then(|v| v.cloned::<T>())
                .unwrap_or_default();
            let result = f(&mut current);
            let value = StateValue::new(current);
            values.insert(path.to_string(), value.clone());
            (result, value)
        };
        self.notify(path, &value);
        result
    }

    /// Remove the value at `path`. Does NOT notify subscribers.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        self.values_write().remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values_read().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored paths, in order.
    pub fn paths(&self) -> Vec<String> {
        self.values_read().keys().cloned().collect()
    }

    /// Subscribe to changes on paths matching `pattern` (`+` and `#` wildcards).
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = HandlerEntry {
            id,
            pattern: pattern.to_string(),
            handler: Arc::new(handler),
        };
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|entry| entry.id != id);
    }

    fn notify(&self, path: &str, value: &StateValue) {
        // Snapshot the matching handlers so a handler may (un)subscribe.
        let matching: Vec<ChangeHandler> = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|entry| topic::matches(&entry.pattern, path))
            .map(|entry| entry.handler.clone())
            .collect();
        for handler in matching {
            handler(path, value);
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        value: u32,
    }

    // ========================================================================
    // Read / write
    // ========================================================================

    #[test]
    fn set_and_get_as() {
        let store = StateStore::new();
        store.set("orders/board", Counter { value: 3 });

        assert_eq!(store.get_as::<Counter>("orders/board"), Some(Counter { value: 3 }));
        assert_eq!(store.get_as::<String>("orders/board"), None);
        assert!(store.get_as::<Counter>("missing").is_none());
    }

    #[test]
    fn read_borrows_without_clone() {
        let store = StateStore::new();
        store.set("n", Counter { value: 7 });

        assert_eq!(store.read("n", |c: &Counter| c.value * 2), Some(14));
        assert_eq!(store.read("missing", |c: &Counter| c.value), None);
    }

    #[test]
    fn remove_contains_len() {
        let store = StateStore::new();
        assert!(store.is_empty());
        store.set("a", 1u32);
        store.set("b", 2u32);
        assert!(store.contains("a"));
        assert_eq!(store.len(), 2);

        assert!(store.remove("a").is_some());
        assert!(!store.contains("a"));
        assert_eq!(store.paths(), vec!["b".to_string()]);
    }

    // ========================================================================
    // Update
    // ========================================================================

    #[test]
    fn update_starts_from_default() {
        let store = StateStore::new();
        let returned = store.update("c", |c: &mut Counter| {
            c.value += 1;
            c.value
        });
        assert_eq!(returned, 1);
        assert_eq!(store.get_as::<Counter>("c"), Some(Counter { value: 1 }));
    }

    #[test]
    fn update_does_not_mutate_previous_snapshot() {
        let store = StateStore::new();
        store.set("c", Counter { value: 1 });
        let before = store.get("c").unwrap();

        store.update("c", |c: &mut Counter| c.value = 9);

        assert_eq!(before.downcast_ref::<Counter>().unwrap().value, 1);
        assert_eq!(store.get_as::<Counter>("c").unwrap().value, 9);
    }

    #[test]
    fn concurrent_updates_do_not_lose_writes() {
        use std::thread;

        let store = Arc::new(StateStore::new());
        let mut handles = vec![];
        for _ in 0..4 {
            let store = store.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..250 {
                    store.update("c", |c: &mut Counter| c.value += 1);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.get_as::<Counter>("c").unwrap().value, 1000);
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    #[test]
    fn subscribe_receives_matching_changes() {
        let store = StateStore::new();
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let seen_c = seen.clone();

        store.subscribe("notifications/#", move |path, _| {
            seen_c.lock().unwrap().push(path.to_string());
        });

        store.set("notifications/feed", Counter::default());
        store.update("notifications/feed", |c: &mut Counter| c.value += 1);
        store.set("orders/board", Counter::default());

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["notifications/feed".to_string(), "notifications/feed".to_string()]
        );
    }

    #[test]
    fn subscriber_sees_new_value() {
        let store = Arc::new(StateStore::new());
        let store_c = store.clone();
        let observed = Arc::new(AtomicU64::new(0));
        let observed_c = observed.clone();

        store.subscribe("c", move |path, _| {
            let v = store_c.get_as::<Counter>(path).unwrap().value;
            observed_c.store(v as u64, Ordering::Relaxed);
        });

        store.update("c", |c: &mut Counter| c.value = 42);
        assert_eq!(observed.load(Ordering::Relaxed), 42);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = StateStore::new();
        let count = Arc::new(AtomicU64::new(0));
        let count_c = count.clone();

        let id = store.subscribe("#", move |_, _| {
            count_c.fetch_add(1, Ordering::Relaxed);
        });
        store.set("a", 1u32);
        store.unsubscribe(id);
        store.set("a", 2u32);

        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn remove_does_not_notify() {
        let store = StateStore::new();
        let count = Arc::new(AtomicU64::new(0));
        let count_c = count.clone();
        store.set("a", 1u32);

        store.subscribe("a", move |_, _| {
            count_c.fetch_add(1, Ordering::Relaxed);
        });
        store.remove("a");

        assert_eq!(count.load(Ordering::Relaxed), 0);
    }
}
