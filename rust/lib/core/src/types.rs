/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Generate a client-side ID of the form `{prefix}-{millis}-{random}`.
///
/// Used for locally synthesized entities that have no server-issued ID.
/// The random suffix keeps two IDs minted in the same millisecond apart.
pub fn prefixed_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = new_id();
    format!("{}-{}-{}", prefix, millis, &random[..9])
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }

    #[test]
    fn test_prefixed_id_unique() {
        let a = prefixed_id("manual");
        let b = prefixed_id("manual");
        assert!(a.starts_with("manual-"));
        assert_eq!(a.split('-').count(), 3);
        assert_ne!(a, b);
    }

    #[test]
    fn test_now_rfc3339() {
        let ts = now_rfc3339();
        assert!(ts.contains('T'));
    }
}
