use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

/// Callback registered for one event name.
pub type Listener = Arc<dyn Fn(Value) + Send + Sync>;

/// Persistent bidirectional event channel (e.g. a Socket.IO client).
///
/// Implementations invoke listeners for inbound events, including the
/// lifecycle events `connect`, `disconnect` and `connect_error`.
pub trait Channel: Send + Sync {
    fn on(&self, event: &str, listener: Listener);
    fn remove_all_listeners(&self);
    fn emit(&self, event: &str, payload: Value);
    /// Start (or retry) connecting. Outcome arrives as a lifecycle event.
    fn connect(&self);
    fn disconnect(&self);
    fn is_connected(&self) -> bool;
}

/// In-process channel. Inbound events are injected with [`deliver`](Self::deliver);
/// outbound emits are recorded.
#[derive(Default)]
pub struct LocalChannel {
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
    emitted: Mutex<Vec<(String, Value)>>,
    connected: AtomicBool,
    connect_calls: AtomicUsize,
}

impl LocalChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn listeners(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Dispatch an inbound event to its listeners. Lifecycle events also
    /// update the connected flag.
    pub fn deliver(&self, event: &str, payload: Value) {
        match event {
            "connect" => self.connected.store(true, Ordering::SeqCst),
            "disconnect" | "connect_error" => self.connected.store(false, Ordering::SeqCst),
            _ => {}
        }
        let targets: Vec<Listener> = self.listeners().get(event).cloned().unwrap_or_default();
        for listener in targets {
            listener(payload.clone());
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners().get(event).map_or(0, Vec::len)
    }

    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.emitted.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

impl Channel for LocalChannel {
    fn on(&self, event: &str, listener: Listener) {
        self.listeners().entry(event.to_string()).or_default().push(listener);
    }

    fn remove_all_listeners(&self) {
        self.listeners().clear();
    }

    fn emit(&self, event: &str, payload: Value) {
        self.emitted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((event.to_string(), payload));
    }

    fn connect(&self) {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
