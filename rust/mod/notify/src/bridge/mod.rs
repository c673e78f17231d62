//! Live event bridge.
//!
//! Attaches to a [`Channel`], classifies every inbound event and routes it
//! into the notification feed and the order board. Owns the connection
//! lifecycle: attempt counting, the retry ceiling and the reconnect timer.

pub mod channel;
pub mod event;
pub mod legacy;

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shopdesk_core::{now_rfc3339, prefixed_id, ClientConfig};
use shopdesk_flux::StateStore;

pub use channel::{Channel, Listener, LocalChannel};
pub use event::{classify, envelope_intent, EnvelopeIntent, LiveEvent, OrderEventKind, OrderSignal};

use crate::error::NotifyError;
use crate::model::{NewOrderSummary, Notification, NotificationPayload, NotificationType};
use crate::state::{ConnectionPhase, ConnectionState, NotificationFeed, OrderBoard, OrderScope};
use crate::toast::{MetricsFn, ToastLevel, ToastSink};

/// Routes live events into client state. Cheap to clone.
#[derive(Clone)]
pub struct LiveBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    store: Arc<StateStore>,
    toasts: Arc<dyn ToastSink>,
    metrics: Option<MetricsFn>,
    config: ClientConfig,
    channel: Mutex<Option<Arc<dyn Channel>>>,
    reconnect: Mutex<Option<CancellationToken>>,
}

impl LiveBridge {
    pub fn new(store: Arc<StateStore>, toasts: Arc<dyn ToastSink>, metrics: Option<MetricsFn>, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                store,
                toasts,
                metrics,
                config,
                channel: Mutex::new(None),
                reconnect: Mutex::new(None),
            }),
        }
    }

    /// Bind to `channel`. Any listeners already on the channel are removed
    /// first, so repeated attaches never duplicate handling.
    pub fn attach(&self, channel: Arc<dyn Channel>) {
        self.cancel_reconnect();
        channel.remove_all_listeners();

        for name in event::SUBSCRIBED {
            let weak: Weak<BridgeInner> = Arc::downgrade(&self.inner);
            let name_owned = name.to_string();
            channel.on(
                name,
                Arc::new(move |payload: Value| {
                    if let Some(inner) = weak.upgrade() {
                        LiveBridge { inner }.handle(&name_owned, payload);
                    }
                }),
            );
        }
        *self.inner.channel_slot() = Some(channel.clone());

        if channel.is_connected() {
            self.inner.store.update(ConnectionState::PATH, |c: &mut ConnectionState| c.connected());
        } else {
            self.inner
                .store
                .update(ConnectionState::PATH, |c: &mut ConnectionState| c.phase = ConnectionPhase::Connecting);
            channel.connect();
        }

        channel.emit(event::PING, json!({ "timestamp": chrono::Utc::now().timestamp_millis() }));
        info!("live bridge attached");
    }

    /// Unbind from the current channel and cancel any pending reconnect.
    pub fn detach(&self) {
        self.cancel_reconnect();
        let channel = self.inner.channel_slot().take();
        if let Some(channel) = channel {
            channel.remove_all_listeners();
            channel.disconnect();
        }
        self.inner.store.set(ConnectionState::PATH, ConnectionState::default());
        info!("live bridge detached");
    }

    pub fn is_attached(&self) -> bool {
        self.inner.channel_slot().is_some()
    }

    pub fn connection(&self) -> ConnectionState {
        self.inner
            .store
            .get_as::<ConnectionState>(ConnectionState::PATH)
            .unwrap_or_default()
    }

    /// Send an outbound event on the attached channel.
    pub fn emit(&self, event: &str, payload: Value) -> Result<(), NotifyError> {
        let channel = self
            .inner
            .channel_slot()
            .clone()
            .ok_or_else(|| NotifyError::Channel("Live channel is not connected".into()))?;
        channel.emit(event, payload);
        Ok(())
    }

    /// Classify and apply one inbound event.
    pub fn handle(&self, event: &str, payload: Value) {
        match classify(event, &payload) {
            LiveEvent::Connected => self.on_connected(),
            LiveEvent::Disconnected { reason } => {
                info!(reason = %reason, "live channel disconnected");
                self.inner.store.update(ConnectionState::PATH, |c: &mut ConnectionState| {
                    c.phase = ConnectionPhase::Disconnected;
                });
            }
            LiveEvent::ConnectError { message } => self.on_connect_error(&message),
            LiveEvent::Order(signal) => self.on_order(signal),
            LiveEvent::Notification(p) => self.on_notification(p),
            LiveEvent::Ignored => debug!(event, "ignored live event"),
        }
    }

    // -- Lifecycle --------------------------------------------------------

    fn on_connected(&self) {
        self.cancel_reconnect();
        self.inner
            .store
            .update(ConnectionState::PATH, |c: &mut ConnectionState| c.connected());
        info!("live channel connected");
    }

    fn on_connect_error(&self, message: &str) {
        let prior = self
            .inner
            .store
            .update(ConnectionState::PATH, |c: &mut ConnectionState| c.failed(message));
        let max = self.inner.config.max_connection_attempts;
        warn!(attempt = prior + 1, max, error = message, "live channel connect error");

        if prior < max {
            self.inner
                .toasts
                .show(ToastLevel::Warning, &format!("Connection error: {}. Retrying...", message));
        }

        let connected = self
            .inner
            .channel_slot()
            .as_ref()
            .is_some_and(|c| c.is_connected());
        if prior + 1 < max && !connected {
            self.schedule_reconnect();
        } else if prior + 1 >= max {
            self.cancel_reconnect();
            warn!(max, "live channel retry ceiling reached");
        }
    }

    fn schedule_reconnect(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime, reconnect not scheduled");
            return;
        };
        let Some(channel) = self.inner.channel_slot().clone() else {
            return;
        };

        let token = CancellationToken::new();
        if let Some(previous) = self.inner.reconnect_slot().replace(token.clone()) {
            previous.cancel();
        }

        let delay = self.inner.config.reconnect_delay();
        let weak = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let Some(inner) = weak.upgrade() else { return };
                    if channel.is_connected() {
                        return;
                    }
                    inner.store.update(ConnectionState::PATH, |c: &mut ConnectionState| {
                        c.phase = ConnectionPhase::Connecting;
                    });
                    debug!("reconnecting live channel");
                    channel.connect();
                }
            }
        });
    }

    fn cancel_reconnect(&self) {
        if let Some(token) = self.inner.reconnect_slot().take() {
            token.cancel();
        }
    }

    // -- Domain events ----------------------------------------------------

    fn on_order(&self, signal: OrderSignal) {
        let notification = Notification {
            id: prefixed_id(signal.id_prefix()),
            title: signal.kind.title().to_string(),
            message: signal.message(),
            kind: NotificationType::Info,
            created_at: now_rfc3339(),
            workspace_id: signal.workspace_id,
            read: false,
            data: Value::Null,
        };
        let message = notification.message.clone();
        self.inner
            .store
            .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.add(notification));

        match signal.status_change() {
            Some(change) => {
                let applied = self
                    .inner
                    .store
                    .update(OrderBoard::PATH, |b: &mut OrderBoard| b.reconcile(&change));
                debug!(order_id = %change.order_id, status = %change.status, applied, "order event reconciled");
            }
            None if signal.status.is_some() => {
                warn!(order_id = ?signal.order_id, status = ?signal.status, "order event with unusable status skipped");
            }
            None => {}
        }

        self.inner.toasts.show(ToastLevel::Info, &message);
    }

    fn on_notification(&self, payload: NotificationPayload) {
        let intent = envelope_intent(&payload);
        let mut notification = payload.into_notification("notification");
        notification.read = false;
        let level = ToastLevel::for_type(notification.kind);
        let text = [&notification.message, &notification.title]
            .into_iter()
            .find(|t| !t.is_empty())
            .cloned()
            .unwrap_or_else(|| "New notification".to_string());
        let id = notification.id.clone();

        let added = self
            .inner
            .store
            .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.add(notification));
        if !added {
            debug!(id = %id, "duplicate notification");
        }

        match intent {
            EnvelopeIntent::StatusChange(change) | EnvelopeIntent::LegacyText(change) => {
                self.inner
                    .store
                    .update(OrderBoard::PATH, |b: &mut OrderBoard| b.reconcile(&change));
            }
            EnvelopeIntent::OrderAssigned(order) => {
                self.inner.store.update(OrderBoard::PATH, |b: &mut OrderBoard| match b.scope() {
                    OrderScope::Assigned => {
                        b.upsert(order);
                    }
                    OrderScope::Own => {
                        b.reconcile(&crate::model::StatusChange {
                            order_id: order.id.clone(),
                            status: order.status,
                            timestamp: order.updated_at.clone(),
                        });
                    }
                    OrderScope::Workspace => {}
                });
            }
            EnvelopeIntent::OrderPlaced(order) => {
                let summary = NewOrderSummary::from(&order);
                self.inner.store.update(OrderBoard::PATH, |b: &mut OrderBoard| {
                    if b.scope() == OrderScope::Workspace {
                        b.upsert(order);
                    }
                });
                if let Some(metrics) = &self.inner.metrics {
                    metrics(&summary);
                }
            }
            EnvelopeIntent::Plain => {}
        }

        self.inner.toasts.show(level, &text);
    }
}

impl BridgeInner {
    fn channel_slot(&self) -> MutexGuard<'_, Option<Arc<dyn Channel>>> {
        self.channel.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reconnect_slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.reconnect.lock().unwrap_or_else(|e| e.into_inner())
    }
}
