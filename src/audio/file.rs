use hound::WavReader;
use std::path::Path;
use tracing::debug;

use super::wav::SAMPLE_RATE;
use crate::error::{PipelineError, Result};

/// A decoded WAV file held in memory.
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path)?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels.max(1) as f64);

        debug!(
            "Audio file loaded: {} ({:.1}s, {}Hz, {} channels, {} samples)",
            path.display(),
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Samples, provided the file is already 16kHz mono.
    pub fn into_canonical_samples(self) -> Result<Vec<i16>> {
        if self.sample_rate == SAMPLE_RATE && self.channels == 1 {
            Ok(self.samples)
        } else {
            Err(PipelineError::StreamRead {
                message: format!(
                    "{}: expected {}Hz mono, got {}Hz {}ch",
                    self.path, SAMPLE_RATE, self.sample_rate, self.channels
                ),
            })
        }
    }
}
