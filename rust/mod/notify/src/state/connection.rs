use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Live channel lifecycle as seen by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionState {
    pub phase: ConnectionPhase,
    /// Consecutive failed connection attempts; reset on connect.
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl ConnectionState {
    pub const PATH: &'static str = "socket/connection";

    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Connected
    }

    pub fn connected(&mut self) {
        self.phase = ConnectionPhase::Connected;
        self.attempts = 0;
        self.last_error = None;
    }

    /// Record a failed attempt and return the attempt count before it.
    pub fn failed(&mut self, message: &str) -> u32 {
        let prior = self.attempts;
        self.phase = ConnectionPhase::Disconnected;
        self.attempts = prior.saturating_add(1);
        self.last_error = Some(message.to_string());
        prior
    }
}
