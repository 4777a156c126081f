use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;
use uuid::Uuid;

use super::state::SessionState;
use crate::resolve::StreamInfo;

/// Snapshot of the URL-pull session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,

    pub session_id: Option<Uuid>,

    /// Locator the session was started with
    pub locator: Option<String>,

    /// Stream title once resolved
    pub title: Option<String>,

    pub is_live: Option<bool>,

    pub started_at: Option<DateTime<Utc>>,

    /// Windows sent to the engine so far
    pub windows_processed: usize,

    /// Segments broadcast so far
    pub segments_published: usize,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            session_id: None,
            locator: None,
            title: None,
            is_live: None,
            started_at: None,
            windows_processed: 0,
            segments_published: 0,
        }
    }
}

/// Shared, lock-guarded session status. All state changes go through here.
#[derive(Clone, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<SessionStatus>>,
}

impl StatusBoard {
    fn lock(&self) -> MutexGuard<'_, SessionStatus> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> SessionStatus {
        self.lock().clone()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Move to `next` if the transition is legal; returns whether it happened.
    pub fn transition(&self, next: SessionState) -> bool {
        let mut status = self.lock();
        if status.state == next {
            return true;
        }
        if !status.state.can_transition_to(next) {
            warn!("Ignoring session transition {:?} -> {:?}", status.state, next);
            return false;
        }
        status.state = next;
        true
    }

    /// Reset for a new session and enter Starting.
    pub fn begin(&self, session_id: Uuid, locator: &str) -> bool {
        let mut status = self.lock();
        if !status.state.can_transition_to(SessionState::Starting) {
            warn!("Cannot start session from {:?}", status.state);
            return false;
        }
        *status = SessionStatus {
            state: SessionState::Starting,
            session_id: Some(session_id),
            locator: Some(locator.to_string()),
            started_at: Some(Utc::now()),
            ..SessionStatus::default()
        };
        true
    }

    pub fn resolved(&self, info: &StreamInfo) {
        let mut status = self.lock();
        status.title = Some(info.title.clone());
        status.is_live = Some(info.is_live);
    }

    pub fn window_processed(&self) {
        self.lock().windows_processed += 1;
    }

    pub fn segment_published(&self) {
        self.lock().segments_published += 1;
    }

    /// Force Idle after teardown, whatever state the session left behind.
    pub fn finish(&self) {
        let mut status = self.lock();
        if status.state != SessionState::Idle && status.state != SessionState::Stopping {
            warn!("Session ended from {:?} without stopping", status.state);
        }
        status.state = SessionState::Idle;
    }
}
