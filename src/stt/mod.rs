//! Transcription engine adapter and session-time arithmetic

pub mod engine;
pub mod timestamp;

pub use engine::{
    normalize_segments, RemoteWhisperEngine, SegmentTranscriber, TranscriptSegment,
    TranscriptionEngine,
};
pub use timestamp::{absolute_time, epoch_millis, wall_clock_time};
