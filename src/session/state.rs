use serde::Serialize;

/// Lifecycle of the URL-pull session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Starting,
    Running,
    Stopping,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Starting)
                | (Starting, Running)
                | (Starting, Stopping)
                | (Running, Stopping)
                | (Stopping, Idle)
        )
    }

    /// Starting or Running.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Starting | SessionState::Running)
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The stream reached its natural end
    Completed,
    /// `stop` or a superseding `start` ended it
    Cancelled,
    /// A session-level error ended it
    Failed(String),
}

impl SessionOutcome {
    /// Text of the final status broadcast.
    pub fn status_text(&self) -> String {
        match self {
            SessionOutcome::Completed => "Recognition completed".to_string(),
            SessionOutcome::Cancelled => "Recognition cancelled".to_string(),
            SessionOutcome::Failed(cause) => format!("Error: {}", cause),
        }
    }
}
