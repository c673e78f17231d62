//! Notification surface consumed by presentation code.
//!
//! Owns no state of its own: every view reads the feed slice from the
//! store, and every action sequences the fetcher, the feed and the bridge.

use std::sync::Arc;

use serde::Serialize;
use serde_json::to_value;
use tracing::{info, warn};

use shopdesk_core::{now_rfc3339, prefixed_id, ClientConfig};
use shopdesk_flux::StateStore;

use crate::bridge::{event, LiveBridge};
use crate::error::NotifyError;
use crate::fetcher::NotificationFetcher;
use crate::model::{Notification, NotificationQuery, NotificationType};
use crate::state::{ConnectionState, NotificationFeed, Pagination};
use crate::toast::{ToastLevel, ToastSink};

/// Whether a read-state change reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSync {
    Remote,
    /// The server call failed; the change was applied locally only.
    LocalOnly,
}

/// A locally-authored notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationType) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
        }
    }
}

/// Outbound `send-notification` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutboundNotice<'a> {
    title: &'a str,
    message: &'a str,
    #[serde(rename = "type")]
    kind: NotificationType,
    workspace_id: i64,
    recipient_id: Option<&'a str>,
    timestamp: String,
}

pub struct NotificationCenter {
    store: Arc<StateStore>,
    fetcher: NotificationFetcher,
    bridge: LiveBridge,
    toasts: Arc<dyn ToastSink>,
    workspace_id: Option<i64>,
    page_size: usize,
    strict_consistency: bool,
}

impl NotificationCenter {
    pub fn new(
        store: Arc<StateStore>,
        fetcher: NotificationFetcher,
        bridge: LiveBridge,
        toasts: Arc<dyn ToastSink>,
        workspace_id: Option<i64>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            bridge,
            toasts,
            workspace_id,
            page_size: config.page_size,
            strict_consistency: config.strict_consistency,
        }
    }

    // =====================================================================
    // Loading
    // =====================================================================

    /// First page of unread notifications.
    pub async fn load_notifications(&self) -> Result<(), NotifyError> {
        self.load(NotificationQuery::unread(self.page_size, self.workspace_id)).await
    }

    /// First page of read and unread notifications.
    pub async fn load_all(&self) -> Result<(), NotifyError> {
        self.load(NotificationQuery::all(self.page_size, self.workspace_id)).await
    }

    /// Next unread page after what is held. No-op when there is nothing
    /// more or a load is in flight.
    pub async fn load_more(&self) -> Result<(), NotifyError> {
        let feed = self.feed();
        if !feed.has_more() || feed.loading {
            return Ok(());
        }
        let query = NotificationQuery {
            offset: feed.len(),
            ..NotificationQuery::unread(self.page_size, self.workspace_id)
        };
        self.load(query).await
    }

    /// Reload the first unread page.
    pub async fn refresh(&self) -> Result<(), NotifyError> {
        self.load_notifications().await
    }

    /// Fetch with an explicit query and install the page.
    pub async fn load(&self, query: NotificationQuery) -> Result<(), NotifyError> {
        self.store.update(NotificationFeed::PATH, |f: &mut NotificationFeed| {
            f.loading = true;
            f.last_error = None;
        });

        match self.fetcher.fetch(&query).await {
            Ok(page) => {
                self.store.update(NotificationFeed::PATH, |f: &mut NotificationFeed| {
                    f.loading = false;
                    f.replace_page(page.notifications, page.total, page.page);
                });
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.store.update(NotificationFeed::PATH, |f: &mut NotificationFeed| {
                    f.loading = false;
                    f.last_error = Some(message);
                });
                Err(e)
            }
        }
    }

    // =====================================================================
    // Read state
    // =====================================================================

    /// Mark one notification read on the server, then locally.
    ///
    /// On server failure the change is applied locally anyway, unless strict
    /// consistency is configured, in which case the error is returned and
    /// the feed is left unchanged.
    pub async fn mark_as_read(&self, id: &str) -> Result<ReadSync, NotifyError> {
        match self.fetcher.mark_read_remote(id).await {
            Ok(()) => {
                self.store
                    .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.mark_read(id));
                self.toasts.show(ToastLevel::Success, "Notification marked as read");
                Ok(ReadSync::Remote)
            }
            Err(e) => self.degrade(e, |f| {
                f.mark_read(id);
            }),
        }
    }

    /// Mark every notification read, with the same fallback as [`mark_as_read`](Self::mark_as_read).
    pub async fn mark_all_read(&self) -> Result<ReadSync, NotifyError> {
        match self.fetcher.mark_all_read_remote(self.workspace_id).await {
            Ok(()) => {
                self.store
                    .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.mark_all_read());
                self.toasts.show(ToastLevel::Success, "All notifications marked as read");
                Ok(ReadSync::Remote)
            }
            Err(e) => self.degrade(e, NotificationFeed::mark_all_read),
        }
    }

    fn degrade(&self, e: NotifyError, local: impl FnOnce(&mut NotificationFeed)) -> Result<ReadSync, NotifyError> {
        let message = e.to_string();
        if self.strict_consistency {
            self.store.update(NotificationFeed::PATH, |f: &mut NotificationFeed| {
                f.last_error = Some(message.clone());
            });
            self.toasts.show(ToastLevel::Error, &message);
            return Err(e);
        }
        warn!(error = %message, "server read sync failed, applying locally");
        self.store.update(NotificationFeed::PATH, |f: &mut NotificationFeed| {
            local(f);
            f.last_error = Some(message.clone());
        });
        self.toasts.show(ToastLevel::Warning, &message);
        Ok(ReadSync::LocalOnly)
    }

    /// Local-only read flag; no server call.
    pub fn mark_as_read_local(&self, id: &str) -> bool {
        self.store
            .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.mark_read(id))
    }

    pub fn mark_all_read_local(&self) {
        self.store
            .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.mark_all_read());
    }

    // =====================================================================
    // Local feed edits
    // =====================================================================

    /// Remove a notification from the feed. Local only.
    pub fn dismiss(&self, id: &str) -> bool {
        self.store
            .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.dismiss(id))
    }

    /// Add a locally-authored notice to the feed; returns its id.
    pub fn add_custom(&self, notice: Notice) -> String {
        let id = prefixed_id("manual");
        let notification = Notification {
            id: id.clone(),
            title: notice.title,
            message: notice.message,
            kind: notice.kind,
            created_at: now_rfc3339(),
            workspace_id: self.workspace_id.unwrap_or(0),
            read: false,
            data: serde_json::Value::Null,
        };
        self.store
            .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.add(notification));
        id
    }

    pub fn clear_all(&self) {
        self.store
            .update(NotificationFeed::PATH, |f: &mut NotificationFeed| f.clear());
    }

    /// Publish a notice to other sessions over the live channel.
    pub fn send_notification(&self, notice: &Notice, recipient_id: Option<&str>) -> Result<(), NotifyError> {
        let body = OutboundNotice {
            title: &notice.title,
            message: &notice.message,
            kind: notice.kind,
            workspace_id: self.workspace_id.unwrap_or(0),
            recipient_id,
            timestamp: now_rfc3339(),
        };
        let payload = to_value(&body).map_err(|e| NotifyError::Channel(e.to_string()))?;
        match self.bridge.emit(event::SEND_NOTIFICATION, payload) {
            Ok(()) => {
                info!(title = %notice.title, "notification sent");
                self.toasts.show(ToastLevel::Success, "Notification sent");
                Ok(())
            }
            Err(e) => {
                self.toasts.show(ToastLevel::Error, &e.to_string());
                Err(e)
            }
        }
    }

    // =====================================================================
    // Views
    // =====================================================================

    pub fn feed(&self) -> NotificationFeed {
        self.store
            .get_as::<NotificationFeed>(NotificationFeed::PATH)
            .unwrap_or_default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.store
            .read(NotificationFeed::PATH, |f: &NotificationFeed| f.items().to_vec())
            .unwrap_or_default()
    }

    pub fn unread(&self) -> Vec<Notification> {
        self.store
            .read(NotificationFeed::PATH, NotificationFeed::unread)
            .unwrap_or_default()
    }

    pub fn read(&self) -> Vec<Notification> {
        self.store
            .read(NotificationFeed::PATH, NotificationFeed::read_items)
            .unwrap_or_default()
    }

    pub fn by_id(&self, id: &str) -> Option<Notification> {
        self.store
            .read(NotificationFeed::PATH, |f: &NotificationFeed| f.get(id).cloned())
            .flatten()
    }

    pub fn by_type(&self, kind: NotificationType) -> Vec<Notification> {
        self.store
            .read(NotificationFeed::PATH, |f: &NotificationFeed| f.by_type(kind))
            .unwrap_or_default()
    }

    pub fn unread_count(&self) -> usize {
        self.store
            .read(NotificationFeed::PATH, NotificationFeed::unread_count)
            .unwrap_or(0)
    }

    pub fn has_more(&self) -> bool {
        self.store
            .read(NotificationFeed::PATH, NotificationFeed::has_more)
            .unwrap_or(false)
    }

    pub fn is_loading(&self) -> bool {
        self.store
            .read(NotificationFeed::PATH, |f: &NotificationFeed| f.loading)
            .unwrap_or(false)
    }

    pub fn last_error(&self) -> Option<String> {
        self.store
            .read(NotificationFeed::PATH, |f: &NotificationFeed| f.last_error.clone())
            .flatten()
    }

    pub fn pagination(&self) -> Pagination {
        self.feed().pagination
    }

    pub fn connection(&self) -> ConnectionState {
        self.bridge.connection()
    }
}
