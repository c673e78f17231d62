//! Free-text status messages from older servers: `Order <id> updated to <STATUS>`.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{OrderStatus, StatusChange};

static LEGACY_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Order #?([\w-]+) updated to (\w+)").expect("legacy status regex is valid")
});

/// Extract a status change from a legacy message. Unknown statuses yield `None`.
pub fn parse(message: &str, timestamp: Option<String>) -> Option<StatusChange> {
    let caps = LEGACY_STATUS.captures(message)?;
    let status = OrderStatus::parse(&caps[2])?;
    Some(StatusChange {
        order_id: caps[1].to_string(),
        status,
        timestamp,
    })
}
