use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::config::SessionConfig;
use super::state::{SessionOutcome, SessionState};
use super::stats::StatusBoard;
use crate::audio::{encode_wav, ChunkWindower, Decoder};
use crate::enrich::Enricher;
use crate::error::Result;
use crate::hub::{BroadcastHub, BroadcastMessage, MessageKind};
use crate::resolve::MediaResolver;
use crate::stt::{absolute_time, SegmentTranscriber};

/// Collaborators shared by the URL-pull session and the push ingest paths
pub struct Pipeline {
    pub resolver: Arc<dyn MediaResolver>,
    pub decoder: Arc<dyn Decoder>,
    pub transcriber: SegmentTranscriber,
    pub enricher: Enricher,
    pub hub: BroadcastHub,
    pub config: SessionConfig,
}

impl Pipeline {
    pub async fn publish_status(&self, text: impl Into<String>) {
        self.hub
            .publish(BroadcastMessage::status(text, &self.config.primary_language))
            .await;
    }

    /// Resolve, decode, window, transcribe and publish until the stream ends
    /// or `cancel` fires.
    ///
    /// The decoder is terminated before this returns on every path: explicitly
    /// on cancellation, and by `DecodeProcess::drop` otherwise.
    pub(crate) async fn drive(
        &self,
        board: &StatusBoard,
        locator: &str,
        cancel: &CancellationToken,
    ) -> Result<SessionOutcome> {
        self.publish_status("Fetching stream info...").await;

        let info = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(SessionOutcome::Cancelled),
            info = self.resolver.resolve(locator) => info?,
        };

        board.resolved(&info);
        board.transition(SessionState::Running);

        let mode = if info.is_live { "Live" } else { "Video" };
        self.publish_status(format!("{}: {}", mode, info.title)).await;
        self.publish_status("Recognition started").await;

        let process = self.decoder.spawn(&info.endpoint).await?;
        let terminator = process.terminator();
        let mut windower = ChunkWindower::new(process, self.config.window.clone());

        let outcome = 'windows: loop {
            if cancel.is_cancelled() {
                break SessionOutcome::Cancelled;
            }

            let window = tokio::select! {
                biased;
                _ = cancel.cancelled() => break SessionOutcome::Cancelled,
                window = windower.next_window() => window?,
            };
            let Some(window) = window else {
                break SessionOutcome::Completed;
            };

            let wav = encode_wav(&window.pcm)?;
            let segments = tokio::select! {
                biased;
                _ = cancel.cancelled() => break SessionOutcome::Cancelled,
                segments = self.transcriber.transcribe(wav) => segments,
            };

            debug!(
                window = window.index,
                segments = segments.len(),
                "Window transcribed"
            );

            for segment in segments {
                let time = absolute_time(window.start_offset_secs, segment.start_secs);
                let translated = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break 'windows SessionOutcome::Cancelled,
                    translated = self.enricher.maybe_translate(&segment.text, &segment.language) => translated,
                };
                if cancel.is_cancelled() {
                    break 'windows SessionOutcome::Cancelled;
                }
                let message =
                    BroadcastMessage::new(MessageKind::Final, segment.text, time, segment.language)
                        .with_translation(translated);

                self.hub.publish(message).await;
                board.segment_published();
            }

            board.window_processed();
        };

        if outcome == SessionOutcome::Cancelled {
            // Unblocks a read still parked on the decoder pipe.
            terminator.terminate();
        }

        info!(
            windows = windower.windows_emitted(),
            elapsed_secs = windower.elapsed_secs(),
            "Session loop finished: {:?}",
            outcome
        );

        Ok(outcome)
    }
}
