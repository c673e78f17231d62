//! Classification of inbound channel events.

use serde_json::Value;

use crate::model::{integer, number, order_from_payload, text, NotificationPayload, Order, OrderStatus, StatusChange};

use super::legacy;

pub const CONNECT: &str = "connect";
pub const DISCONNECT: &str = "disconnect";
pub const CONNECT_ERROR: &str = "connect_error";
pub const ORDER_NEW: &str = "order:new";
pub const ORDER_CREATED: &str = "order:created";
pub const ORDER_UPDATED: &str = "order:updated";
pub const ORDER_STATUS_UPDATED: &str = "order:statusUpdated";
pub const RECEIVE_NOTIFICATION: &str = "receive-notification";

pub const PING: &str = "ping";
pub const SEND_NOTIFICATION: &str = "send-notification";

/// Inbound event names the bridge listens on.
pub const SUBSCRIBED: &[&str] = &[
    CONNECT,
    DISCONNECT,
    CONNECT_ERROR,
    ORDER_NEW,
    ORDER_CREATED,
    ORDER_UPDATED,
    ORDER_STATUS_UPDATED,
    RECEIVE_NOTIFICATION,
];

const ORDER_ASSIGNED_TITLE: &str = "Order Assigned";
const NEW_ORDER_PLACED_TITLE: &str = "New Order Placed";

// ---------------------------------------------------------------------------
// LiveEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Connected,
    Disconnected { reason: String },
    ConnectError { message: String },
    Order(OrderSignal),
    Notification(NotificationPayload),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEventKind {
    /// `order:new`
    New,
    /// `order:created`
    Created,
    /// `order:updated`
    Updated,
    /// `order:statusUpdated`
    StatusChanged,
}

impl OrderEventKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ORDER_NEW => Some(Self::New),
            ORDER_CREATED => Some(Self::Created),
            ORDER_UPDATED => Some(Self::Updated),
            ORDER_STATUS_UPDATED => Some(Self::StatusChanged),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::New => "New Order",
            Self::Created => "Order Created",
            Self::Updated => "Order Updated",
            Self::StatusChanged => "Order Status Update",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            Self::New => "order-new",
            Self::Created => "order-created",
            Self::Updated => "order-updated",
            Self::StatusChanged => "order-status",
        }
    }
}

/// Order lifecycle event with whatever fields the payload carried.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSignal {
    pub kind: OrderEventKind,
    pub order_id: Option<String>,
    /// Raw status as sent.
    pub status: Option<String>,
    pub total_amount: Option<f64>,
    /// Buyer display name from `user.name`, on new orders.
    pub customer_name: Option<String>,
    pub workspace_id: i64,
    pub timestamp: Option<String>,
}

impl OrderSignal {
    fn from_value(kind: OrderEventKind, v: &Value) -> Self {
        Self {
            kind,
            order_id: text(v, "id").or_else(|| text(v, "orderId")),
            status: text(v, "status"),
            total_amount: number(v, "totalAmount"),
            customer_name: v.get("user").and_then(|u| text(u, "name")),
            workspace_id: integer(v, "workspaceId").unwrap_or(0),
            timestamp: text(v, "updatedAt").or_else(|| text(v, "timestamp")),
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        self.kind.id_prefix()
    }

    /// Status to reconcile. `order:created` without a status means `PENDING`.
    pub fn effective_status(&self) -> Option<OrderStatus> {
        match (&self.status, self.kind) {
            (Some(raw), _) => OrderStatus::parse(raw),
            (None, OrderEventKind::Created) => Some(OrderStatus::Pending),
            (None, _) => None,
        }
    }

    pub fn status_change(&self) -> Option<StatusChange> {
        Some(StatusChange {
            order_id: self.order_id.clone()?,
            status: self.effective_status()?,
            timestamp: self.timestamp.clone(),
        })
    }

    /// Notification body, worded as the server words it.
    pub fn message(&self) -> String {
        let id = self.order_id.as_deref().unwrap_or("unknown");
        match self.kind {
            OrderEventKind::New => format!(
                "New order received from {} - ${}",
                self.customer_name.as_deref().unwrap_or("customer"),
                self.total_amount.unwrap_or(0.0)
            ),
            OrderEventKind::Created => format!("New order #{} created", id),
            OrderEventKind::Updated | OrderEventKind::StatusChanged => format!(
                "Order {} updated to {}",
                id,
                self.status.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

/// Classify an inbound event by name, then by payload shape.
pub fn classify(event: &str, payload: &Value) -> LiveEvent {
    match event {
        CONNECT => return LiveEvent::Connected,
        DISCONNECT => {
            let reason = payload
                .as_str()
                .map(str::to_string)
                .or_else(|| text(payload, "reason"))
                .unwrap_or_else(|| "unknown".to_string());
            return LiveEvent::Disconnected { reason };
        }
        CONNECT_ERROR => {
            let message = payload
                .as_str()
                .map(str::to_string)
                .or_else(|| text(payload, "message"))
                .unwrap_or_else(|| "connection failed".to_string());
            return LiveEvent::ConnectError { message };
        }
        _ => {}
    }
    if let Some(kind) = OrderEventKind::from_name(event) {
        return LiveEvent::Order(OrderSignal::from_value(kind, payload));
    }
    if event == RECEIVE_NOTIFICATION || NotificationPayload::is_envelope(payload) {
        return LiveEvent::Notification(NotificationPayload::from_value(payload));
    }
    LiveEvent::Ignored
}

// ---------------------------------------------------------------------------
// Envelope intent
// ---------------------------------------------------------------------------

/// What a notification envelope asks the order board to do.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeIntent {
    /// Structured `data: {type: ORDER_UPDATE, orderId, status}`.
    StatusChange(StatusChange),
    /// Status change recovered from a legacy free-text message.
    LegacyText(StatusChange),
    /// Full order assigned to the recipient.
    OrderAssigned(Order),
    /// Full order newly placed in the recipient's workspace.
    OrderPlaced(Order),
    Plain,
}

/// Decide what an envelope means for order state. Structured data wins
/// over titles, titles over legacy text.
pub fn envelope_intent(p: &NotificationPayload) -> EnvelopeIntent {
    if let Some(change) = structured_change(p) {
        return EnvelopeIntent::StatusChange(change);
    }
    match p.title.as_str() {
        ORDER_ASSIGNED_TITLE => {
            if let Some(order) = p.data.get("fullOrder").and_then(order_from_payload) {
                return EnvelopeIntent::OrderAssigned(order);
            }
        }
        NEW_ORDER_PLACED_TITLE => {
            if let Some(order) = p
                .data
                .get("orderResponsePayload")
                .and_then(|r| r.get("order"))
                .and_then(order_from_payload)
            {
                return EnvelopeIntent::OrderPlaced(order);
            }
        }
        _ => {}
    }
    if let Some(change) = legacy::parse(&p.message, p.created_at.clone()) {
        return EnvelopeIntent::LegacyText(change);
    }
    EnvelopeIntent::Plain
}

fn structured_change(p: &NotificationPayload) -> Option<StatusChange> {
    let data = &p.data;
    let declared = text(data, "type")?;
    if !declared.eq_ignore_ascii_case("ORDER_UPDATE") {
        return None;
    }
    Some(StatusChange {
        order_id: text(data, "orderId").or_else(|| text(data, "id"))?,
        status: OrderStatus::parse(&text(data, "status")?)?,
        timestamp: p.created_at.clone(),
    })
}
