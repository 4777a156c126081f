//! Error taxonomy for the ingestion pipeline.
//!
//! Session-level failures (`Resolution`, `Spawn`, `StreamRead`) end the
//! active session with an error status. Window- and segment-level failures
//! (`Engine`, `Enrichment`) are recovered where they happen and only logged.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no playable audio stream: {message}")]
    Resolution { message: String },

    #[error("failed to launch decoder: {message}")]
    Spawn { message: String },

    #[error("audio stream read failed: {message}")]
    StreamRead { message: String },

    #[error("transcription failed: {message}")]
    Engine { message: String },

    #[error("translation failed: {message}")]
    Enrichment { message: String },

    #[error("audio encoding failed: {0}")]
    Encode(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failures talking to the language model service.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("cannot reach the language model service")]
    Unavailable(#[source] reqwest::Error),

    #[error("the language model service timed out")]
    Timeout,

    #[error("language model call failed ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("the language model returned an unusable response")]
    BadResponse,
}

/// Failures of the transcript summarization operation.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("there is no text to summarize")]
    NothingToSummarize,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Rejections of client-produced recognition events.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid json")]
    InvalidJson,

    #[error("type must be final or interim")]
    InvalidKind,
}
