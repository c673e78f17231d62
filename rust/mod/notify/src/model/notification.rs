use serde::{Deserialize, Serialize};
use serde_json::Value;

use shopdesk_core::{now_rfc3339, prefixed_id};

use super::{flag, integer, text};

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Info,
    Warning,
    Error,
    Success,
    System,
    OrderUpdate,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Success => "SUCCESS",
            Self::System => "SYSTEM",
            Self::OrderUpdate => "ORDER_UPDATE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Some(Self::Info),
            "WARNING" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            "SUCCESS" => Some(Self::Success),
            "SYSTEM" => Some(Self::System),
            "ORDER_UPDATE" => Some(Self::OrderUpdate),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A notification as held by the feed. `read` is always normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub created_at: String,
    /// 0 when not scoped to a workspace.
    pub workspace_id: i64,
    pub read: bool,
    /// Opaque payload; may embed order data used for reconciliation.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

// ---------------------------------------------------------------------------
// NotificationPayload: lenient wire shape
// ---------------------------------------------------------------------------

/// A notification as it arrives from the history API or the live channel.
///
/// Field defaults when absent or mistyped:
/// - `id`: none; a client ID is minted on normalization
/// - `title`, `message`: `""`
/// - `type`: kept raw; unknown values normalize to `INFO`
/// - `createdAt`: the time of normalization
/// - `workspaceId`: 0
/// - `read` / `isRead` (`is-read`): interchangeable; unread when both absent
/// - `data`: `null`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationPayload {
    pub id: Option<String>,
    pub title: String,
    pub message: String,
    pub declared_type: Option<String>,
    pub created_at: Option<String>,
    pub workspace_id: i64,
    pub read: Option<bool>,
    pub data: Value,
}

impl NotificationPayload {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: text(v, "id").filter(|s| !s.is_empty()),
            title: text(v, "title").unwrap_or_default(),
            message: text(v, "message").unwrap_or_default(),
            declared_type: text(v, "type"),
            created_at: text(v, "createdAt"),
            workspace_id: integer(v, "workspaceId").unwrap_or(0),
            read: flag(v, "read")
                .or_else(|| flag(v, "isRead"))
                .or_else(|| flag(v, "is-read")),
            data: v.get("data").cloned().unwrap_or(Value::Null),
        }
    }

    /// Whether the payload looks like a notification envelope at all.
    pub fn is_envelope(v: &Value) -> bool {
        v.get("title").is_some() && v.get("message").is_some()
    }

    pub fn kind(&self) -> NotificationType {
        self.declared_type
            .as_deref()
            .and_then(NotificationType::parse)
            .unwrap_or(NotificationType::Info)
    }

    /// Normalize into a feed entry, minting `{id_prefix}-...` when no ID is present.
    pub fn into_notification(self, id_prefix: &str) -> Notification {
        let kind = self.kind();
        Notification {
            id: self.id.unwrap_or_else(|| prefixed_id(id_prefix)),
            title: self.title,
            message: self.message,
            kind,
            created_at: self.created_at.unwrap_or_else(now_rfc3339),
            workspace_id: self.workspace_id,
            read: self.read.unwrap_or(false),
            data: self.data,
        }
    }
}

// ---------------------------------------------------------------------------
// History API shapes
// ---------------------------------------------------------------------------

/// Query for `GET /notifications`.
///
/// `is_read: None` omits the filter entirely, returning read and unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationQuery {
    pub is_read: Option<bool>,
    pub limit: usize,
    pub offset: usize,
    pub workspace_id: Option<i64>,
}

impl NotificationQuery {
    /// First page of unread notifications.
    pub fn unread(limit: usize, workspace_id: Option<i64>) -> Self {
        Self {
            is_read: Some(false),
            limit,
            offset: 0,
            workspace_id,
        }
    }

    /// First page of all notifications.
    pub fn all(limit: usize, workspace_id: Option<i64>) -> Self {
        Self {
            is_read: None,
            ..Self::unread(limit, workspace_id)
        }
    }

    /// Query-string pairs. Zero limit/offset and a zero workspace are omitted.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(is_read) = self.is_read {
            pairs.push(("isRead", is_read.to_string()));
        }
        if self.limit > 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        if self.offset > 0 {
            pairs.push(("offset", self.offset.to_string()));
        }
        if let Some(ws) = self.workspace_id.filter(|ws| *ws != 0) {
            pairs.push(("workspaceId", ws.to_string()));
        }
        pairs
    }
}

/// Raw `GET /notifications` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNotificationPage {
    #[serde(default)]
    pub notifications: Vec<Value>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub pagination: PageInfo,
}

/// Server-reported pagination cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}
