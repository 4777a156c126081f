//! Media locator resolution
//!
//! Turns a page URL (YouTube live or VOD, ...) into a directly playable audio
//! endpoint plus display metadata, using yt-dlp.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::process::Stdio;
use tracing::info;

use crate::config::ResolverConfig;
use crate::error::{PipelineError, Result};

/// A playable audio endpoint and its metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    /// URL the decoder can open directly
    pub endpoint: String,
    pub title: String,
    pub is_live: bool,
    /// Duration in seconds; unknown for live streams
    pub duration_secs: Option<f64>,
}

#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Fails with `PipelineError::Resolution` when no audio stream exists.
    async fn resolve(&self, locator: &str) -> Result<StreamInfo>;
}

pub struct YtDlpResolver {
    ytdlp_path: String,
    format: String,
}

impl YtDlpResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            ytdlp_path: config.ytdlp_path.clone(),
            format: config.format.clone(),
        }
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn resolve(&self, locator: &str) -> Result<StreamInfo> {
        info!("Resolving {} with {}", locator, self.ytdlp_path);

        let output = tokio::process::Command::new(&self.ytdlp_path)
            .args(["-J", "--no-warnings", "--no-playlist", "-f", &self.format, "--"])
            .arg(locator)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PipelineError::Resolution {
                message: format!("failed to run {}: {}", self.ytdlp_path, e),
            })?;

        if !output.status.success() {
            return Err(PipelineError::Resolution {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let info: Value =
            serde_json::from_slice(&output.stdout).map_err(|e| PipelineError::Resolution {
                message: format!("unreadable metadata: {}", e),
            })?;

        parse_stream_info(&info)
    }
}

/// Pick the audio endpoint out of yt-dlp's JSON metadata.
///
/// Prefers the selected format's top-level `url`, then the last listed format
/// that carries an audio codec.
pub fn parse_stream_info(info: &Value) -> Result<StreamInfo> {
    let endpoint = info
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            info.get("formats")?
                .as_array()?
                .iter()
                .rev()
                .filter(|f| f.get("acodec").and_then(Value::as_str) != Some("none"))
                .find_map(|f| f.get("url").and_then(Value::as_str).map(str::to_string))
        })
        .ok_or_else(|| PipelineError::Resolution {
            message: "no audio format found".to_string(),
        })?;

    Ok(StreamInfo {
        endpoint,
        title: info
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        is_live: info.get("is_live").and_then(Value::as_bool).unwrap_or(false),
        duration_secs: info.get("duration").and_then(Value::as_f64),
    })
}
