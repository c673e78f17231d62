//! Per-session composition root.
//!
//! A [`Session`] is created when a user signs in and disposed when they
//! sign out. It owns the state store, the live bridge and the two
//! presentation surfaces; nothing here lives in globals.

use std::sync::Arc;

use tracing::info;

use shopdesk_client::{RestClient, TokenSource};
use shopdesk_core::{ClientConfig, Role};
use shopdesk_flux::StateStore;

use crate::api::{HttpApi, NotificationApi, OrderApi};
use crate::bridge::{Channel, LiveBridge};
use crate::controller::OrderStatusController;
use crate::facade::NotificationCenter;
use crate::fetcher::NotificationFetcher;
use crate::state::{ConnectionState, DashboardState, NotificationFeed, OrderBoard, OrderScope};
use crate::toast::{MetricsFn, ToastSink, TracingToasts};

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProfile {
    pub user_id: String,
    pub role: Role,
    pub workspace_id: Option<i64>,
}

/// Collaborators injected into a session.
#[derive(Clone)]
pub struct SessionDeps {
    pub notification_api: Arc<dyn NotificationApi>,
    pub order_api: Arc<dyn OrderApi>,
    pub toasts: Arc<dyn ToastSink>,
    pub metrics: Option<MetricsFn>,
}

impl SessionDeps {
    /// REST-backed APIs over `client`, toasts to the log.
    pub fn http(client: RestClient) -> Self {
        let api = Arc::new(HttpApi::new(client));
        Self {
            notification_api: api.clone(),
            order_api: api,
            toasts: Arc::new(TracingToasts::default()),
            metrics: None,
        }
    }

    /// REST client against `config.api_base_url`; toasts logged with the
    /// configured display duration.
    pub fn from_config(config: &ClientConfig, token_source: Arc<dyn TokenSource>) -> Self {
        let client = RestClient::new(config.api_base_url.clone(), token_source);
        Self::http(client).with_toasts(Arc::new(TracingToasts::new(config.toast_duration())))
    }

    pub fn with_toasts(mut self, toasts: Arc<dyn ToastSink>) -> Self {
        self.toasts = toasts;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsFn) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

pub struct Session {
    profile: SessionProfile,
    store: Arc<StateStore>,
    bridge: LiveBridge,
    notifications: NotificationCenter,
    orders: OrderStatusController,
}

impl Session {
    /// Seed the state slices for `profile` and wire the surfaces together.
    /// No I/O happens until a load or [`connect`](Self::connect).
    pub fn start(profile: SessionProfile, config: ClientConfig, deps: SessionDeps) -> Self {
        let store = Arc::new(StateStore::new());
        let scope = OrderScope::for_role(profile.role);
        store.set(NotificationFeed::PATH, NotificationFeed::with_retention(config.retention_limit));
        store.set(OrderBoard::PATH, OrderBoard::new(scope));
        store.set(ConnectionState::PATH, ConnectionState::default());
        store.set(DashboardState::PATH, DashboardState::default());

        let bridge = LiveBridge::new(store.clone(), deps.toasts.clone(), deps.metrics.clone(), config.clone());
        let notifications = NotificationCenter::new(
            store.clone(),
            NotificationFetcher::new(deps.notification_api.clone()),
            bridge.clone(),
            deps.toasts.clone(),
            profile.workspace_id,
            &config,
        );
        let orders = OrderStatusController::new(store.clone(), deps.order_api.clone(), deps.toasts.clone(), profile.workspace_id);

        info!(user_id = %profile.user_id, role = %profile.role, ?scope, "session started");
        Self {
            profile,
            store,
            bridge,
            notifications,
            orders,
        }
    }

    /// Attach the live channel. Safe to call again after a reconnect.
    pub fn connect(&self, channel: Arc<dyn Channel>) {
        self.bridge.attach(channel);
    }

    /// Detach the channel and drop all session state.
    pub fn dispose(self) {
        self.bridge.detach();
        self.store
            .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.clear());
        self.store
            .update(OrderBoard::PATH, |b: &mut OrderBoard| b.clear());
        self.store.set(DashboardState::PATH, DashboardState::default());
        info!(user_id = %self.profile.user_id, "session disposed");
    }

    pub fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn bridge(&self) -> &LiveBridge {
        &self.bridge
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn orders(&self) -> &OrderStatusController {
        &self.orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use shopdesk_client::NoAuth;

    use crate::bridge::LocalChannel;
    use crate::state::ConnectionPhase;

    fn profile(role: Role) -> SessionProfile {
        SessionProfile {
            user_id: "u-1".into(),
            role,
            workspace_id: Some(2),
        }
    }

    fn deps() -> SessionDeps {
        let config = ClientConfig {
            api_base_url: "http://127.0.0.1:9".into(),
            ..ClientConfig::default()
        };
        SessionDeps::from_config(&config, Arc::new(NoAuth))
    }

    #[test]
    fn start_seeds_slices_for_role() {
        let config = ClientConfig {
            retention_limit: 5,
            ..ClientConfig::default()
        };
        let session = Session::start(profile(Role::Staff), config, deps());

        assert_eq!(session.orders().scope(), OrderScope::Assigned);
        assert_eq!(session.notifications().feed().retention(), 5);
        assert_eq!(session.notifications().connection().phase, ConnectionPhase::Disconnected);
    }

    #[tokio::test]
    async fn from_config_targets_configured_api() {
        use axum::routing::get;
        use axum::{Json, Router};

        let app = Router::new().route(
            "/notifications",
            get(|| async {
                Json(serde_json::json!({
                    "notifications": [{"id": "n1", "title": "t", "message": "m", "isRead": false}],
                    "total": 1,
                    "pagination": {"limit": 10, "offset": 0}
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = ClientConfig {
            api_base_url: format!("http://{}", addr),
            ..ClientConfig::default()
        };
        let deps = SessionDeps::from_config(&config, Arc::new(NoAuth));
        let session = Session::start(profile(Role::Staff), config, deps);

        session.notifications().load_notifications().await.unwrap();
        assert_eq!(session.notifications().unread_count(), 1);
    }

    #[test]
    fn dispose_detaches_and_clears() {
        let session = Session::start(profile(Role::Manager), ClientConfig::default(), deps());
        let channel = LocalChannel::new();
        session.connect(channel.clone());
        channel.deliver("connect", serde_json::Value::Null);
        channel.deliver(
            "receive-notification",
            serde_json::json!({"id": "n1", "title": "t", "message": "m"}),
        );
        assert_eq!(session.notifications().unread_count(), 1);

        let store = session.store().clone();
        session.dispose();

        assert_eq!(channel.listener_count("receive-notification"), 0);
        let feed = store.get_as::<NotificationFeed>(NotificationFeed::PATH).unwrap();
        assert!(feed.is_empty());
        assert!(!store.get_as::<ConnectionState>(ConnectionState::PATH).unwrap().is_connected());
    }
}
