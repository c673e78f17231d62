//! REST endpoints used by the fetcher and the status controller.
//!
//! The traits are the seam tests replace with in-memory fakes; [`HttpApi`]
//! is the production implementation over [`RestClient`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use shopdesk_client::{ApiError, RestClient};

use crate::model::{order_from_payload, NotificationQuery, Order, OrderStatus, RawNotificationPage, StaffDashboard};

#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// `GET /notifications`
    async fn list(&self, query: &NotificationQuery) -> Result<RawNotificationPage, ApiError>;

    /// `PATCH /notifications/{id}/read`
    async fn mark_read(&self, id: &str) -> Result<(), ApiError>;

    /// `PATCH /notifications/mark-all-read[?workspaceId=]`
    async fn mark_all_read(&self, workspace_id: Option<i64>) -> Result<(), ApiError>;
}

/// Server reply to a status change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusAck {
    #[serde(default)]
    pub message: Option<String>,
}

#[async_trait]
pub trait OrderApi: Send + Sync {
    /// `PATCH /orders/workspaces/{ws}/orders/{id}/status`
    async fn update_status(&self, workspace_id: i64, order_id: &str, status: OrderStatus) -> Result<StatusAck, ApiError>;

    /// `GET /staff/{ws}/dashboard`
    async fn staff_dashboard(&self, workspace_id: i64) -> Result<StaffDashboard, ApiError>;

    /// `GET /orders/workspaces/{ws}/orders`
    async fn workspace_orders(&self, workspace_id: i64) -> Result<Vec<Order>, ApiError>;
}

/// Both APIs over one authenticated [`RestClient`].
#[derive(Clone)]
pub struct HttpApi {
    client: RestClient,
}

impl HttpApi {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationApi for HttpApi {
    async fn list(&self, query: &NotificationQuery) -> Result<RawNotificationPage, ApiError> {
        self.client.get("/notifications", &query.to_pairs()).await
    }

    async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .patch_empty(&format!("/notifications/{}/read", id), &[])
            .await
    }

    async fn mark_all_read(&self, workspace_id: Option<i64>) -> Result<(), ApiError> {
        let query: Vec<(&str, String)> = workspace_id
            .map(|ws| vec![("workspaceId", ws.to_string())])
            .unwrap_or_default();
        self.client
            .patch_empty("/notifications/mark-all-read", &query)
            .await
    }
}

#[async_trait]
impl OrderApi for HttpApi {
    async fn update_status(&self, workspace_id: i64, order_id: &str, status: OrderStatus) -> Result<StatusAck, ApiError> {
        let path = format!("/orders/workspaces/{}/orders/{}/status", workspace_id, order_id);
        self.client.patch(&path, &json!({ "status": status })).await
    }

    async fn staff_dashboard(&self, workspace_id: i64) -> Result<StaffDashboard, ApiError> {
        let body: Value = self
            .client
            .get(&format!("/staff/{}/dashboard", workspace_id), &[])
            .await?;
        Ok(StaffDashboard::from_payload(&body))
    }

    async fn workspace_orders(&self, workspace_id: i64) -> Result<Vec<Order>, ApiError> {
        let body: Value = self
            .client
            .get(&format!("/orders/workspaces/{}/orders", workspace_id), &[])
            .await?;
        let list = match &body {
            Value::Array(items) => items.as_slice(),
            _ => body
                .get("data")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .ok_or_else(|| ApiError::Decode("orders: expected a list".into()))?,
        };
        Ok(list.iter().filter_map(order_from_payload).collect())
    }
}
