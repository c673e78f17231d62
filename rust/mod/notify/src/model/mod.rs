//! Domain models and their lenient wire decoding.
//!
//! Inbound payloads are not contractually shaped: every field may be missing
//! or carry an unexpected JSON type. Decoding never fails; absent fields fall
//! back to documented defaults.

pub mod dashboard;
pub mod notification;
pub mod order;

pub use dashboard::{StaffDashboard, StaffStats};
pub use notification::{
    Notification, NotificationPayload, NotificationQuery, NotificationType, PageInfo, RawNotificationPage,
};
pub use order::{
    order_from_payload, Customer, NewOrderSummary, Order, OrderItem, OrderStatus, PaymentStatus,
    ShippingAddress, StatusChange, Variant,
};

use serde_json::Value;

/// String field; numbers are stringified, anything else is absent.
pub(crate) fn text(v: &Value, key: &str) -> Option<String> {
    match v.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// String field defaulting to `""`.
pub(crate) fn text_or_empty(v: &Value, key: &str) -> String {
    text(v, key).unwrap_or_default()
}

/// Numeric field; numeric strings (decimal columns) are accepted.
pub(crate) fn number(v: &Value, key: &str) -> Option<f64> {
    match v.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer field; numeric strings are accepted.
pub(crate) fn integer(v: &Value, key: &str) -> Option<i64> {
    match v.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn flag(v: &Value, key: &str) -> Option<bool> {
    v.get(key).and_then(Value::as_bool)
}
