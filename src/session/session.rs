use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::pipeline::Pipeline;
use super::state::{SessionOutcome, SessionState};
use super::stats::{SessionStatus, StatusBoard};

struct ActiveSession {
    id: Uuid,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Single-flight controller for the URL-pull session.
///
/// At most one session runs at a time. `start` tears the previous session
/// down completely (final status published, decoder terminated) before the
/// next one begins, and only one `start`/`stop` transition is in flight at
/// any moment.
pub struct SessionController {
    pipeline: Arc<Pipeline>,
    board: StatusBoard,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionController {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            board: StatusBoard::default(),
            active: Mutex::new(None),
        }
    }

    /// Start a session for `locator`, replacing any current one.
    pub async fn start(&self, locator: &str) -> Uuid {
        let mut active = self.active.lock().await;

        if let Some(previous) = active.take() {
            info!(session = %previous.id, "Replacing active session");
            self.teardown(previous).await;
        }

        let id = Uuid::new_v4();
        self.board.begin(id, locator);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(
            run_session(
                Arc::clone(&self.pipeline),
                self.board.clone(),
                locator.to_string(),
                cancel.clone(),
            )
            .instrument(info_span!("session", %id)),
        );

        info!(session = %id, "Session started for {}", locator);
        *active = Some(ActiveSession { id, cancel, task });

        id
    }

    /// Cancel the active session and wait for its teardown.
    ///
    /// Returns `false` when there was nothing to stop.
    pub async fn stop(&self) -> bool {
        let mut active = self.active.lock().await;

        match active.take() {
            Some(session) => {
                self.teardown(session).await;
                true
            }
            None => false,
        }
    }

    async fn teardown(&self, session: ActiveSession) {
        if !session.task.is_finished() {
            self.board.transition(SessionState::Stopping);
        }
        session.cancel.cancel();

        if let Err(e) = session.task.await {
            error!(session = %session.id, "Session task panicked: {}", e);
            self.board.finish();
        }

        info!(session = %session.id, "Session torn down");
    }

    pub fn status(&self) -> SessionStatus {
        self.board.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.board.state()
    }

    pub fn is_running(&self) -> bool {
        self.board.state().is_active()
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }
}

async fn run_session(
    pipeline: Arc<Pipeline>,
    board: StatusBoard,
    locator: String,
    cancel: CancellationToken,
) {
    let result = AssertUnwindSafe(pipeline.drive(&board, &locator, &cancel))
        .catch_unwind()
        .await;

    board.transition(SessionState::Stopping);

    let outcome = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            error!("Session failed: {}", e);
            SessionOutcome::Failed(e.to_string())
        }
        Err(_) => {
            error!("Session pipeline panicked");
            SessionOutcome::Failed("internal error".to_string())
        }
    };

    info!("Session ended: {:?}", outcome);
    pipeline.publish_status(outcome.status_text()).await;

    board.finish();
}
