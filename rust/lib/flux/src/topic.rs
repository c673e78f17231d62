//! MQTT-style topic matching for subscription patterns.
//!
//! - Exact: `orders/board`
//! - Single level: `socket/+` matches `socket/connection`
//! - Multi level: `notifications/#` matches `notifications` and anything below
//! - All: `#`

/// Whether `topic` is matched by `pattern`.
pub fn matches(pattern: &str, topic: &str) -> bool {
    let mut pattern_levels = pattern.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (pattern_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(p), Some(t)) if p == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
