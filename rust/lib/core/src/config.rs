use std::time::Duration;

use serde::Deserialize;

/// Client configuration shared by the REST boundary, the live bridge and
/// the notification/order stores.
///
/// Every field has a default, so a partial JSON document (or no document at
/// all) yields a usable configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Page size for notification history requests.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum number of notifications kept in memory after live inserts.
    #[serde(default = "default_retention_limit")]
    pub retention_limit: usize,

    /// Connect failures tolerated before reconnects and warnings stop.
    #[serde(default = "default_max_connection_attempts")]
    pub max_connection_attempts: u32,

    /// Fixed delay before a reconnect attempt, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// When true, a failed remote mark-read leaves local state untouched
    /// instead of falling back to a local-only mark.
    #[serde(default)]
    pub strict_consistency: bool,

    /// How long a toast stays on screen, in milliseconds.
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_retention_limit() -> usize {
    50
}

fn default_max_connection_attempts() -> u32 {
    3
}

fn default_reconnect_delay_ms() -> u64 {
    2000
}

fn default_toast_duration_ms() -> u64 {
    5000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            retention_limit: default_retention_limit(),
            max_connection_attempts: default_max_connection_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            strict_consistency: false,
            toast_duration_ms: default_toast_duration_ms(),
        }
    }
}

impl ClientConfig {
    /// Parse configuration from command-line arguments.
    ///
    /// Supported flags:
    /// - `--api=URL`
    /// - `--toast-ms=N`
    /// - `--page-size=N`
    /// - `--retention=N`
    /// - `--max-attempts=N`
    /// - `--reconnect-delay-ms=N`
    /// - `--strict`
    ///
    /// Unknown flags and unparsable numbers are ignored.
    pub fn from_args(args: &[String]) -> Self {
        let mut config = ClientConfig::default();

        for arg in args {
            if let Some(val) = arg.strip_prefix("--api=") {
                config.api_base_url = val.trim_end_matches('/').to_string();
            } else if let Some(val) = arg.strip_prefix("--toast-ms=") {
                if let Ok(n) = val.parse() {
                    config.toast_duration_ms = n;
                }
            } else if let Some(val) = arg.strip_prefix("--page-size=") {
                if let Ok(n) = val.parse() {
                    config.page_size = n;
                }
            } else if let Some(val) = arg.strip_prefix("--retention=") {
                if let Ok(n) = val.parse() {
                    config.retention_limit = n;
                }
            } else if let Some(val) = arg.strip_prefix("--max-attempts=") {
                if let Ok(n) = val.parse() {
                    config.max_connection_attempts = n;
                }
            } else if let Some(val) = arg.strip_prefix("--reconnect-delay-ms=") {
                if let Ok(n) = val.parse() {
                    config.reconnect_delay_ms = n;
                }
            } else if arg == "--strict" {
                config.strict_consistency = true;
            }
        }

        config
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.retention_limit, 50);
        assert_eq!(config.max_connection_attempts, 3);
        assert_eq!(config.reconnect_delay(), Duration::from_secs(2));
        assert!(!config.strict_consistency);
    }

    #[test]
    fn test_from_args() {
        let args = vec![
            "--api=https://api.example.com/".to_string(),
            "--page-size=25".to_string(),
            "--toast-ms=1500".to_string(),
            "--max-attempts=oops".to_string(),
            "--strict".to_string(),
            "--unknown=1".to_string(),
        ];
        let config = ClientConfig::from_args(&args);
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.toast_duration(), Duration::from_millis(1500));
        assert_eq!(config.max_connection_attempts, 3);
        assert!(config.strict_consistency);
    }

    #[test]
    fn test_partial_json() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"retentionLimit": 20, "reconnectDelayMs": 500}"#).unwrap();
        assert_eq!(config.retention_limit, 20);
        assert_eq!(config.reconnect_delay(), Duration::from_millis(500));
        assert_eq!(config.page_size, 10);
    }
}
