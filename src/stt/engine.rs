use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{PipelineError, Result};
use crate::language::engine_language;

/// One recognized utterance, timed relative to the start of its audio buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Recognized text
    pub text: String,

    /// Start offset in seconds
    pub start_secs: f64,

    /// End offset in seconds
    pub end_secs: f64,

    /// Language tag reported by the engine (may be empty)
    pub language: String,
}

/// Speech-recognition engine.
///
/// Input is a canonical WAV container; output is the utterances found in it.
/// Silence filtering is the engine's job.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<Vec<TranscriptSegment>>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: TranscriptionEngine + ?Sized> TranscriptionEngine for Arc<T> {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<Vec<TranscriptSegment>> {
        (**self).transcribe(wav).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    text: String,
}

/// OpenAI-compatible `/audio/transcriptions` endpoint (whisper.cpp server,
/// faster-whisper-server, ...) queried with `response_format=verbose_json`.
pub struct RemoteWhisperEngine {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl RemoteWhisperEngine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Engine {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            url: format!("{}/audio/transcriptions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl TranscriptionEngine for RemoteWhisperEngine {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<Vec<TranscriptSegment>> {
        let engine_error = |message: String| PipelineError::Engine { message };

        let file_part = Part::bytes(wav)
            .file_name("window.wav")
            .mime_str("audio/wav")
            .map_err(|e| engine_error(format!("invalid multipart part: {}", e)))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");

        debug!("Sending transcription request to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| engine_error(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(engine_error(format!("HTTP {}: {}", status, detail.trim())));
        }

        let body: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| engine_error(format!("malformed response: {}", e)))?;

        let language = body.language.unwrap_or_default();
        Ok(body
            .segments
            .into_iter()
            .map(|s| TranscriptSegment {
                text: s.text,
                start_secs: s.start,
                end_secs: s.end,
                language: language.clone(),
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Wraps an engine so a failing buffer yields no segments instead of an error.
#[derive(Clone)]
pub struct SegmentTranscriber {
    engine: Arc<dyn TranscriptionEngine>,
    primary_language: String,
}

impl SegmentTranscriber {
    pub fn new(engine: Arc<dyn TranscriptionEngine>, primary_language: impl Into<String>) -> Self {
        Self {
            engine,
            primary_language: primary_language.into(),
        }
    }

    /// Transcribe one container buffer into ordered, non-overlapping segments.
    pub async fn transcribe(&self, wav: Vec<u8>) -> Vec<TranscriptSegment> {
        match self.engine.transcribe(wav).await {
            Ok(raw) => normalize_segments(raw, &self.primary_language),
            Err(e) => {
                warn!("Engine {} failed, skipping buffer: {}", self.engine.name(), e);
                Vec::new()
            }
        }
    }
}

/// Trim, drop empty text, order by start and clip overlaps.
pub fn normalize_segments(raw: Vec<TranscriptSegment>, primary_language: &str) -> Vec<TranscriptSegment> {
    let mut segments: Vec<TranscriptSegment> = raw
        .into_iter()
        .filter_map(|mut s| {
            let text = s.text.trim();
            if text.is_empty() {
                return None;
            }
            s.text = text.to_string();
            s.start_secs = s.start_secs.max(0.0);
            s.language = engine_language(&s.language, primary_language);
            Some(s)
        })
        .collect();

    segments.sort_by(|a, b| a.start_secs.total_cmp(&b.start_secs));

    let mut previous_end = 0.0f64;
    for segment in &mut segments {
        if segment.start_secs < previous_end {
            segment.start_secs = previous_end;
        }
        if segment.end_secs < segment.start_secs {
            segment.end_secs = segment.start_secs;
        }
        previous_end = segment.end_secs;
    }

    segments
}
