//! Transient user-facing messages.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::model::{NewOrderSummary, NotificationType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    /// Toast level for a notification type. Anything unmapped is informational.
    pub fn for_type(kind: NotificationType) -> Self {
        match kind {
            NotificationType::Success => ToastLevel::Success,
            NotificationType::Warning => ToastLevel::Warning,
            NotificationType::Error => ToastLevel::Error,
            NotificationType::Info | NotificationType::System | NotificationType::OrderUpdate => ToastLevel::Info,
        }
    }
}

/// Presentation hook for toasts.
pub trait ToastSink: Send + Sync {
    fn show(&self, level: ToastLevel, message: &str);
}

/// Receives the summary of each newly placed order (dashboard metrics).
pub type MetricsFn = Arc<dyn Fn(&NewOrderSummary) + Send + Sync>;

/// Writes toasts to the log. Default sink when no UI is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingToasts {
    duration: Duration,
}

impl TracingToasts {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// How long each toast would stay on screen.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for TracingToasts {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000))
    }
}

impl ToastSink for TracingToasts {
    fn show(&self, level: ToastLevel, message: &str) {
        let duration_ms = self.duration.as_millis() as u64;
        match level {
            ToastLevel::Info | ToastLevel::Success => info!(?level, message, duration_ms, "toast"),
            ToastLevel::Warning => warn!(message, duration_ms, "toast"),
            ToastLevel::Error => error!(message, duration_ms, "toast"),
        }
    }
}

/// Keeps every toast in memory, in order.
#[derive(Default)]
pub struct RecordingToasts {
    shown: Mutex<Vec<(ToastLevel, String)>>,
}

impl RecordingToasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<(ToastLevel, String)> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<(ToastLevel, String)> {
        self.shown().pop()
    }
}

impl ToastSink for RecordingToasts {
    fn show(&self, level: ToastLevel, message: &str) {
        self.shown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_by_type() {
        assert_eq!(ToastLevel::for_type(NotificationType::Success), ToastLevel::Success);
        assert_eq!(ToastLevel::for_type(NotificationType::Error), ToastLevel::Error);
        assert_eq!(ToastLevel::for_type(NotificationType::Warning), ToastLevel::Warning);
        assert_eq!(ToastLevel::for_type(NotificationType::OrderUpdate), ToastLevel::Info);
        assert_eq!(ToastLevel::for_type(NotificationType::System), ToastLevel::Info);
    }

    #[test]
    fn tracing_sink_carries_duration() {
        let sink = TracingToasts::new(Duration::from_millis(1500));
        assert_eq!(sink.duration(), Duration::from_millis(1500));
        sink.show(ToastLevel::Warning, "slow network");
        assert_eq!(TracingToasts::default().duration(), Duration::from_secs(5));
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingToasts::new();
        sink.show(ToastLevel::Info, "one");
        sink.show(ToastLevel::Error, "two");

        assert_eq!(sink.shown().len(), 2);
        assert_eq!(sink.last(), Some((ToastLevel::Error, "two".to_string())));
    }
}
