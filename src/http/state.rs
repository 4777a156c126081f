use std::sync::Arc;

use crate::enrich::Summarizer;
use crate::hub::BroadcastHub;
use crate::ingest::{AudioPushIngest, SenderIngest};
use crate::session::SessionController;

/// Shared application state for HTTP and WebSocket handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub hub: BroadcastHub,
    pub summarizer: Summarizer,
    pub sender: SenderIngest,
    pub audio_push: AudioPushIngest,
    /// Inbound WebSocket message cap
    pub max_message_bytes: usize,
}

impl AppState {
    pub fn new(
        controller: Arc<SessionController>,
        summarizer: Summarizer,
        scratch_dir: impl Into<std::path::PathBuf>,
        max_message_bytes: usize,
    ) -> Self {
        let pipeline = Arc::clone(controller.pipeline());
        Self {
            hub: pipeline.hub.clone(),
            sender: SenderIngest::new(Arc::clone(&pipeline)),
            audio_push: AudioPushIngest::new(pipeline, scratch_dir),
            controller,
            summarizer,
            max_message_bytes,
        }
    }
}
