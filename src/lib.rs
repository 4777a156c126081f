pub mod audio;
pub mod config;
pub mod enrich;
pub mod error;
pub mod http;
pub mod hub;
pub mod ingest;
pub mod language;
pub mod resolve;
pub mod session;
pub mod stt;

pub use audio::{encode_wav, ChunkWindower, DecodeProcess, Decoder, FfmpegDecoder, WindowConfig};
pub use config::Config;
pub use enrich::{Enricher, LlmClient, LlmTranslator, Summarizer, Translator};
pub use error::{PipelineError, ProtocolError, Result};
pub use http::{create_router, AppState, ConnectionRole};
pub use hub::{BroadcastHub, BroadcastMessage, MessageKind, Viewer};
pub use ingest::{AudioPushIngest, SenderIngest};
pub use resolve::{MediaResolver, StreamInfo, YtDlpResolver};
pub use session::{Pipeline, SessionConfig, SessionController, SessionOutcome, SessionState};
pub use stt::{RemoteWhisperEngine, SegmentTranscriber, TranscriptSegment, TranscriptionEngine};
