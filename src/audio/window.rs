use tracing::{debug, info};

use super::decoder::DecodeProcess;
use super::wav::{pcm_duration_secs, BYTES_PER_SAMPLE, SAMPLE_RATE, WAV_HEADER_BYTES};
use crate::config::AudioConfig;
use crate::error::{PipelineError, Result};

/// Window sizing
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Duration of each window in seconds (default: 10)
    pub window_secs: u32,
    /// Minimum viable window in bytes (default: 3200, about 0.1s)
    pub min_bytes: usize,
}

impl WindowConfig {
    pub fn window_bytes(&self) -> usize {
        SAMPLE_RATE as usize * BYTES_PER_SAMPLE * self.window_secs as usize
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_secs: 10,
            min_bytes: 3200,
        }
    }
}

impl From<&AudioConfig> for WindowConfig {
    fn from(audio: &AudioConfig) -> Self {
        Self {
            window_secs: audio.window_secs,
            min_bytes: audio.min_window_bytes,
        }
    }
}

/// One fixed-duration slice of decoded PCM
#[derive(Debug, Clone)]
pub struct AudioWindow {
    /// Window number (0-indexed)
    pub index: usize,
    /// Raw 16-bit little-endian mono PCM
    pub pcm: Vec<u8>,
    /// Nominal duration in seconds
    pub duration_secs: f64,
    /// Session time at which this window starts, in seconds
    pub start_offset_secs: f64,
}

/// Splits a decoder byte stream into fixed-size windows.
pub struct ChunkWindower {
    config: WindowConfig,
    process: DecodeProcess,
    window_index: usize,
    bytes_consumed: usize,
    header_skipped: bool,
    finished: bool,
}

impl ChunkWindower {
    pub fn new(process: DecodeProcess, config: WindowConfig) -> Self {
        info!(
            "Chunk windower initialized: {}s windows ({} bytes, min {} bytes)",
            config.window_secs,
            config.window_bytes(),
            config.min_bytes
        );

        Self {
            config,
            process,
            window_index: 0,
            bytes_consumed: 0,
            header_skipped: false,
            finished: false,
        }
    }

    /// Consume and discard the container header that precedes the PCM.
    pub async fn skip_header(&mut self) -> Result<()> {
        if self.header_skipped {
            return Ok(());
        }

        let header = self.process.read(WAV_HEADER_BYTES).await?;
        if header.len() < WAV_HEADER_BYTES {
            self.finished = true;
            return Err(PipelineError::StreamRead {
                message: format!(
                    "stream ended after {} header bytes",
                    header.len()
                ),
            });
        }

        self.header_skipped = true;
        Ok(())
    }

    /// Read the next window, or `None` once the stream has ended.
    ///
    /// A full window is returned as soon as `window_bytes` have arrived. A
    /// short read of at least `min_bytes` is returned as a final partial
    /// window; anything shorter is end of stream.
    pub async fn next_window(&mut self) -> Result<Option<AudioWindow>> {
        if self.finished {
            return Ok(None);
        }
        self.skip_header().await?;

        let pcm = self.process.read(self.config.window_bytes()).await?;

        if pcm.is_empty() || pcm.len() < self.config.min_bytes {
            debug!(
                "End of stream after {} windows ({} trailing bytes dropped)",
                self.window_index,
                pcm.len()
            );
            self.finished = true;
            return Ok(None);
        }

        if pcm.len() < self.config.window_bytes() {
            // The decoder only returns short at end of stream.
            self.finished = true;
        }

        let window = AudioWindow {
            index: self.window_index,
            duration_secs: pcm_duration_secs(pcm.len()),
            start_offset_secs: self.elapsed_secs(),
            pcm,
        };

        self.window_index += 1;
        self.bytes_consumed += window.pcm.len();

        debug!(
            "Window {} ready: {:.1}s - {:.1}s ({} bytes)",
            window.index,
            window.start_offset_secs,
            window.start_offset_secs + window.duration_secs,
            window.pcm.len()
        );

        Ok(Some(window))
    }

    /// Session time covered so far, in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        pcm_duration_secs(self.bytes_consumed)
    }

    pub fn windows_emitted(&self) -> usize {
        self.window_index
    }
}
