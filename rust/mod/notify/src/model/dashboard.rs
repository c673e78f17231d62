use serde::Serialize;
use serde_json::Value;

use super::order::{order_from_payload, Order};
use super::{flag, integer, number, text};

/// Aggregate counters shown on the staff dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffStats {
    pub total_orders: i64,
    pub orders_today: i64,
    pub processing_orders: i64,
    pub completed_orders: i64,
    pub successful_deliveries: i64,
    pub total_revenue: f64,
}

/// `GET /staff/{workspace}/dashboard` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffDashboard {
    pub available: bool,
    pub workspace_name: Option<String>,
    pub stats: StaffStats,
    pub assigned_orders: Vec<Order>,
}

impl StaffDashboard {
    /// Decode leniently. A body wrapped in `{"data": {...}}` is unwrapped.
    /// Orders without an id are dropped.
    pub fn from_payload(v: &Value) -> Self {
        let body = match v.get("data") {
            Some(inner) if inner.is_object() => inner,
            _ => v,
        };

        let empty = Value::Null;
        let stats = body.get("stats").unwrap_or(&empty);

        Self {
            available: flag(body, "availabilityStatus").unwrap_or(false),
            workspace_name: body.get("workspaceDetails").and_then(|w| text(w, "name")),
            stats: StaffStats {
                total_orders: integer(stats, "totalOrders").unwrap_or(0),
                orders_today: integer(stats, "ordersToday").unwrap_or(0),
                processing_orders: integer(stats, "processingOrders").unwrap_or(0),
                completed_orders: integer(stats, "completedOrders").unwrap_or(0),
                successful_deliveries: integer(stats, "successfulDeliveries").unwrap_or(0),
                total_revenue: number(stats, "totalRevenue").unwrap_or(0.0),
            },
            assigned_orders: body
                .get("assignedOrders")
                .and_then(Value::as_array)
                .map(|orders| orders.iter().filter_map(order_from_payload).collect())
                .unwrap_or_default(),
        }
    }
}
