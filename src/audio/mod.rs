pub mod decoder;
pub mod file;
pub mod wav;
pub mod window;

pub use decoder::{DecodeProcess, Decoder, FfmpegDecoder, ProcessTerminator, Terminate};
pub use file::AudioFile;
pub use wav::{encode_samples, encode_wav, SAMPLE_RATE, WAV_HEADER_BYTES};
pub use window::{AudioWindow, ChunkWindower, WindowConfig};
