use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audio::{encode_samples, AudioFile};
use crate::error::{PipelineError, Result};
use crate::hub::{BroadcastMessage, MessageKind};
use crate::session::Pipeline;
use crate::stt::wall_clock_time;

/// Ingest for clients that push self-contained compressed audio blobs.
///
/// Every blob is converted, transcribed and published on its own; there is no
/// windowing and no session-time accumulation. Connections are independent of
/// each other and of the URL-pull session.
#[derive(Clone)]
pub struct AudioPushIngest {
    pipeline: Arc<Pipeline>,
    scratch_dir: PathBuf,
}

impl AudioPushIngest {
    pub fn new(pipeline: Arc<Pipeline>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Scratch state for one pushing connection.
    pub fn connection(&self) -> AudioPushConnection {
        let id = Uuid::new_v4();
        AudioPushConnection {
            id,
            pipeline: Arc::clone(&self.pipeline),
            blob_path: self.scratch_dir.join(format!("livestt_audio_{}.webm", id)),
            wav_path: self.scratch_dir.join(format!("livestt_audio_{}.wav", id)),
        }
    }
}

/// One pushing connection. Its scratch files are removed on drop.
pub struct AudioPushConnection {
    id: Uuid,
    pipeline: Arc<Pipeline>,
    blob_path: PathBuf,
    wav_path: PathBuf,
}

impl AudioPushConnection {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn scratch_paths(&self) -> [&Path; 2] {
        [&self.blob_path, &self.wav_path]
    }

    /// Transcribe one blob and publish its segments.
    ///
    /// Failures are logged and the blob skipped; returns the number of
    /// segments published.
    pub async fn handle_blob(&self, blob: &[u8]) -> usize {
        let samples = match self.decode_blob(blob).await {
            Ok(Some(samples)) => samples,
            Ok(None) => return 0,
            Err(e) => {
                warn!(connection = %self.id, "Skipping pushed blob: {}", e);
                return 0;
            }
        };

        let wav = match encode_samples(&samples) {
            Ok(wav) => wav,
            Err(e) => {
                warn!(connection = %self.id, "Skipping pushed blob: {}", e);
                return 0;
            }
        };

        let segments = self.pipeline.transcriber.transcribe(wav).await;
        let count = segments.len();

        for segment in segments {
            let translated = self
                .pipeline
                .enricher
                .maybe_translate(&segment.text, &segment.language)
                .await;
            let message = BroadcastMessage::new(
                MessageKind::Final,
                segment.text,
                wall_clock_time(),
                segment.language,
            )
            .with_translation(translated);

            self.pipeline.hub.publish(message).await;
        }

        debug!(connection = %self.id, segments = count, "Pushed blob processed");
        count
    }

    /// Persist, convert and read back one blob. `Ok(None)` means conversion failed.
    async fn decode_blob(&self, blob: &[u8]) -> Result<Option<Vec<i16>>> {
        tokio::fs::write(&self.blob_path, blob).await?;

        if !self
            .pipeline
            .decoder
            .convert(&self.blob_path, &self.wav_path)
            .await
        {
            warn!(connection = %self.id, bytes = blob.len(), "Audio conversion failed, skipping blob");
            return Ok(None);
        }

        let wav_path = self.wav_path.clone();
        let samples = tokio::task::spawn_blocking(move || {
            AudioFile::open(&wav_path)?.into_canonical_samples()
        })
        .await
        .map_err(|e| PipelineError::StreamRead {
            message: format!("reader task failed: {}", e),
        })??;

        Ok(Some(samples))
    }
}

impl Drop for AudioPushConnection {
    fn drop(&mut self) {
        for path in [&self.blob_path, &self.wav_path] {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed scratch file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove scratch file {}: {}", path.display(), e),
            }
        }
        info!(connection = %self.id, "Audio push connection closed");
    }
}
