use std::sync::Arc;

use tracing::{debug, error};

use crate::api::NotificationApi;
use crate::error::NotifyError;
use crate::model::{Notification, NotificationPayload, NotificationQuery, PageInfo};

/// A normalized page of notification history.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub notifications: Vec<Notification>,
    pub total: usize,
    pub page: PageInfo,
}

/// Retrieves notification history and pushes read-state changes.
///
/// Stateless: results are handed back to the caller, which installs them
/// into the feed.
#[derive(Clone)]
pub struct NotificationFetcher {
    api: Arc<dyn NotificationApi>,
}

impl NotificationFetcher {
    pub fn new(api: Arc<dyn NotificationApi>) -> Self {
        Self { api }
    }

    pub async fn fetch(&self, query: &NotificationQuery) -> Result<FetchedPage, NotifyError> {
        let raw = self.api.list(query).await.map_err(|e| {
            error!(error = %e, offset = query.offset, "notification fetch failed");
            NotifyError::api("Failed to fetch notifications", e)
        })?;

        // Servers that omit the cursor get the requested one echoed back.
        let page = PageInfo {
            limit: if raw.pagination.limit == 0 { query.limit } else { raw.pagination.limit },
            offset: if raw.pagination.limit == 0 { query.offset } else { raw.pagination.offset },
        };
        let notifications: Vec<Notification> = raw
            .notifications
            .iter()
            .map(|v| NotificationPayload::from_value(v).into_notification("notification"))
            .collect();

        debug!(count = notifications.len(), total = raw.total, offset = page.offset, "notifications fetched");
        Ok(FetchedPage {
            notifications,
            total: raw.total,
            page,
        })
    }

    pub async fn mark_read_remote(&self, id: &str) -> Result<(), NotifyError> {
        self.api.mark_read(id).await.map_err(|e| {
            error!(error = %e, id, "mark read failed");
            NotifyError::api("Failed to mark notification as read", e)
        })
    }

    pub async fn mark_all_read_remote(&self, workspace_id: Option<i64>) -> Result<(), NotifyError> {
        self.api.mark_all_read(workspace_id).await.map_err(|e| {
            error!(error = %e, ?workspace_id, "mark all read failed");
            NotifyError::api("Failed to mark all notifications as read", e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use serde_json::json;
    use shopdesk_client::ApiError;

    use crate::model::RawNotificationPage;

    struct FakeApi {
        page: RawNotificationPage,
        fail: bool,
    }

    #[async_trait]
    impl NotificationApi for FakeApi {
        async fn list(&self, _query: &NotificationQuery) -> Result<RawNotificationPage, ApiError> {
            if self.fail {
                return Err(ApiError::Server { status: 500, message: String::new() });
            }
            Ok(self.page.clone())
        }

        async fn mark_read(&self, _id: &str) -> Result<(), ApiError> {
            if self.fail {
                return Err(ApiError::Server { status: 404, message: "Notification not found".into() });
            }
            Ok(())
        }

        async fn mark_all_read(&self, _workspace_id: Option<i64>) -> Result<(), ApiError> {
            Err(ApiError::Auth("expired".into()))
        }
    }

    fn fetcher(page: RawNotificationPage, fail: bool) -> NotificationFetcher {
        NotificationFetcher::new(Arc::new(FakeApi { page, fail }))
    }

    #[tokio::test]
    async fn fetch_normalizes_items() {
        let raw = RawNotificationPage {
            notifications: vec![
                json!({"id": "a", "title": "t", "message": "m", "type": "WARNING", "isRead": true}),
                json!({"title": "no id"}),
            ],
            total: 2,
            pagination: PageInfo { limit: 10, offset: 0 },
        };
        let page = fetcher(raw, false)
            .fetch(&NotificationQuery::all(10, None))
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert!(page.notifications[0].read);
        assert!(page.notifications[1].id.starts_with("notification-"));
        assert!(!page.notifications[1].read);
    }

    #[tokio::test]
    async fn missing_cursor_echoes_query() {
        let query = NotificationQuery { offset: 20, ..NotificationQuery::unread(10, None) };
        let page = fetcher(RawNotificationPage::default(), false)
            .fetch(&query)
            .await
            .unwrap();
        assert_eq!(page.page, PageInfo { limit: 10, offset: 20 });
    }

    #[tokio::test]
    async fn failures_use_fallback_or_server_message() {
        let f = fetcher(RawNotificationPage::default(), true);

        let err = f.fetch(&NotificationQuery::unread(10, None)).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch notifications");

        let err = f.mark_read_remote("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Notification not found");

        let err = f.mark_all_read_remote(Some(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to mark all notifications as read");
    }
}
