use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::audio::WindowConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub decoder: DecoderConfig,
    pub resolver: ResolverConfig,
    pub engine: EngineConfig,
    pub language: LanguageConfig,
    pub llm: LlmConfig,
    pub hub: HubConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Directory served for any path not matched by the API
    pub static_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "livestt".to_string(),
            http: HttpConfig::default(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8765,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Window length; the decoded stream is always 16 kHz mono 16-bit
    pub window_secs: u32,
    /// Reads shorter than this are treated as end of stream
    pub min_window_bytes: usize,
    /// Where pushed blobs and converted files are written (OS temp dir if unset)
    pub scratch_dir: Option<PathBuf>,
    pub max_message_bytes: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            window_secs: 10,
            min_window_bytes: 3200,
            scratch_dir: None,
            max_message_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AudioConfig {
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub ffmpeg_path: String,
    pub convert_timeout_secs: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            convert_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub ytdlp_path: String,
    pub format: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            format: "bestaudio/best".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// OpenAI-compatible transcription endpoint (e.g. a local whisper server)
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/v1".to_string(),
            model: "small".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Segments in any other language get a translation into this one
    pub primary: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            primary: "ko".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub translate_timeout_secs: u64,
    pub summary_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "gemma3:4b".to_string(),
            translate_timeout_secs: 15,
            summary_timeout_secs: 90,
        }
    }
}

impl LlmConfig {
    pub fn translate_timeout(&self) -> Duration {
        Duration::from_secs(self.translate_timeout_secs)
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub replay_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            replay_capacity: 500,
        }
    }
}

impl Config {
    /// Load from an optional config file, then `LIVESTT__SECTION__KEY` env overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("LIVESTT").separator("__"))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the windower cannot honour.
    pub fn validate(&self) -> Result<()> {
        let window_bytes = WindowConfig::from(&self.audio).window_bytes();
        if self.audio.window_secs == 0 {
            bail!("audio.window_secs must be at least 1");
        }
        if self.audio.min_window_bytes == 0 || self.audio.min_window_bytes > window_bytes {
            bail!(
                "audio.min_window_bytes must be between 1 and {} (one window), got {}",
                window_bytes,
                self.audio.min_window_bytes
            );
        }
        Ok(())
    }
}
