use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

use crate::error::Result;

/// Sample rate of every buffer handed to the transcription engine.
pub const SAMPLE_RATE: u32 = 16000;

/// 16-bit signed PCM.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Size of the canonical RIFF/WAVE header the decoder emits ahead of PCM.
pub const WAV_HEADER_BYTES: usize = 44;

fn canonical_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Wrap raw little-endian PCM in a canonical 16 kHz mono 16-bit WAV container.
///
/// Output is deterministic: the same input always yields the same bytes.
/// A dangling odd byte cannot form a sample and is dropped.
pub fn encode_wav(pcm: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(WAV_HEADER_BYTES + pcm.len()));

    {
        let mut writer = WavWriter::new(&mut cursor, canonical_spec())?;
        for pair in pcm.chunks_exact(BYTES_PER_SAMPLE) {
            writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Same as [`encode_wav`] for already-decoded samples.
pub fn encode_samples(samples: &[i16]) -> Result<Vec<u8>> {
    let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    encode_wav(&pcm)
}

/// Seconds of audio held by `bytes` of canonical PCM.
pub fn pcm_duration_secs(bytes: usize) -> f64 {
    bytes as f64 / (SAMPLE_RATE as f64 * BYTES_PER_SAMPLE as f64)
}
