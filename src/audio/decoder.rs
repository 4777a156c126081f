use async_trait::async_trait;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::DecoderConfig;
use crate::error::{PipelineError, Result};

/// Something that can be forcibly stopped to release a blocked reader.
pub trait Terminate: Send {
    fn terminate(self: Box<Self>);
}

impl Terminate for Child {
    fn terminate(mut self: Box<Self>) {
        if let Err(e) = self.kill() {
            // Already exited; reaping below is still required.
            debug!("Decoder kill: {}", e);
        }

        let mut reap = move || match self.wait() {
            Ok(status) => debug!("Decoder exited: {}", status),
            Err(e) => warn!("Failed to reap decoder process: {}", e),
        };

        // `wait` blocks, so keep it off the async workers.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(reap);
            }
            Err(_) => reap(),
        }
    }
}

/// Cloneable handle that kills the decoder from any task.
///
/// Killing the process closes its stdout, which turns an in-flight blocking
/// read into end-of-stream.
#[derive(Clone)]
pub struct ProcessTerminator {
    handle: Arc<Mutex<Option<Box<dyn Terminate>>>>,
}

impl ProcessTerminator {
    /// Idempotent; only the first call reaches the process.
    pub fn terminate(&self) {
        let taken = {
            let mut slot = self.handle.lock().unwrap_or_else(|e| e.into_inner());
            slot.take()
        };

        if let Some(handle) = taken {
            info!("Terminating decoder process");
            handle.terminate();
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

/// A running decode process: a blocking byte stream plus its terminator.
pub struct DecodeProcess {
    reader: Arc<Mutex<Box<dyn Read + Send>>>,
    terminator: ProcessTerminator,
}

impl DecodeProcess {
    pub fn new(reader: impl Read + Send + 'static, handle: impl Terminate + 'static) -> Self {
        Self {
            reader: Arc::new(Mutex::new(Box::new(reader))),
            terminator: ProcessTerminator {
                handle: Arc::new(Mutex::new(Some(Box::new(handle)))),
            },
        }
    }

    /// Read up to `n` bytes on the blocking pool.
    ///
    /// Returns fewer bytes (possibly none) only at end of stream.
    pub async fn read(&self, n: usize) -> Result<Vec<u8>> {
        let reader = Arc::clone(&self.reader);

        let bytes = tokio::task::spawn_blocking(move || {
            let mut reader = reader.lock().unwrap_or_else(|e| e.into_inner());
            let mut buf = Vec::with_capacity(n);
            reader.by_ref().take(n as u64).read_to_end(&mut buf)?;
            Ok::<_, std::io::Error>(buf)
        })
        .await
        .map_err(|e| PipelineError::StreamRead {
            message: format!("reader task failed: {}", e),
        })??;

        Ok(bytes)
    }

    pub fn terminator(&self) -> ProcessTerminator {
        self.terminator.clone()
    }

    pub fn terminate(&self) {
        self.terminator.terminate();
    }
}

impl Drop for DecodeProcess {
    fn drop(&mut self) {
        self.terminator.terminate();
    }
}

/// External audio decoder, used in streaming and one-shot modes.
#[async_trait]
pub trait Decoder: Send + Sync {
    /// Start decoding `endpoint` into a canonical 16 kHz mono WAV byte stream.
    async fn spawn(&self, endpoint: &str) -> Result<DecodeProcess>;

    /// Convert a file into a canonical WAV file. Failure is reported as `false`.
    async fn convert(&self, input: &Path, output: &Path) -> bool;
}

/// ffmpeg-backed decoder
pub struct FfmpegDecoder {
    ffmpeg_path: String,
    convert_timeout: Duration,
}

impl FfmpegDecoder {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            convert_timeout: Duration::from_secs(config.convert_timeout_secs),
        }
    }

    fn output_args() -> [&'static str; 10] {
        [
            "-f",
            "wav",
            "-acodec",
            "pcm_s16le",
            "-ar",
            "16000",
            "-ac",
            "1",
            "-loglevel",
            "error",
        ]
    }
}

#[async_trait]
impl Decoder for FfmpegDecoder {
    async fn spawn(&self, endpoint: &str) -> Result<DecodeProcess> {
        info!("Starting {} decoder", self.ffmpeg_path);

        let mut child = Command::new(&self.ffmpeg_path)
            .args(["-i", endpoint])
            .args(Self::output_args())
            .arg("pipe:1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PipelineError::Spawn {
                message: format!("{}: {}", self.ffmpeg_path, e),
            })?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                Box::new(child).terminate();
                return Err(PipelineError::Spawn {
                    message: "decoder stdout was not captured".to_string(),
                });
            }
        };

        // Unread stderr would eventually fill its pipe and stall the decoder.
        if let Some(stderr) = child.stderr.take() {
            std::thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                    if !line.is_empty() {
                        debug!("ffmpeg: {}", line);
                    }
                }
            });
        }

        Ok(DecodeProcess::new(stdout, child))
    }

    async fn convert(&self, input: &Path, output: &Path) -> bool {
        let run = tokio::process::Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(Self::output_args())
            .arg(output)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.convert_timeout, run).await {
            Ok(Ok(out)) if out.status.success() => true,
            Ok(Ok(out)) => {
                warn!(
                    "ffmpeg conversion failed ({}): {}",
                    out.status,
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                false
            }
            Ok(Err(e)) => {
                warn!("Failed to launch ffmpeg for conversion: {}", e);
                false
            }
            Err(_) => {
                warn!(
                    "ffmpeg conversion timed out after {:?}",
                    self.convert_timeout
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandle(Arc<AtomicUsize>);

    impl Terminate for CountingHandle {
        fn terminate(self: Box<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_read_returns_short_at_end_of_stream() {
        let calls = Arc::new(AtomicUsize::new(0));
        let process = DecodeProcess::new(Cursor::new(vec![1u8; 10]), CountingHandle(calls));

        assert_eq!(process.read(6).await.unwrap().len(), 6);
        assert_eq!(process.read(6).await.unwrap().len(), 4);
        assert!(process.read(6).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terminate_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let process =
            DecodeProcess::new(Cursor::new(Vec::new()), CountingHandle(Arc::clone(&calls)));
        let terminator = process.terminator();

        terminator.terminate();
        process.terminate();
        terminator.terminate();
        drop(process);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(terminator.is_terminated());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminating_a_real_process_releases_its_reader() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let stdout = child.stdout.take().unwrap();
        let process = DecodeProcess::new(stdout, child);

        let started = std::time::Instant::now();
        process.terminate();
        let bytes = tokio::time::timeout(Duration::from_secs(5), process.read(16))
            .await
            .unwrap()
            .unwrap();

        assert!(bytes.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(process.terminator().is_terminated());
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_is_spawn_error() {
        let decoder = FfmpegDecoder::new(&DecoderConfig {
            ffmpeg_path: "/nonexistent/ffmpeg-livestt".to_string(),
            convert_timeout_secs: 1,
        });

        let err = decoder.spawn("http://example.invalid/audio").await.err();
        assert!(matches!(err, Some(PipelineError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_convert_missing_binary_returns_false() {
        let decoder = FfmpegDecoder::new(&DecoderConfig {
            ffmpeg_path: "/nonexistent/ffmpeg-livestt".to_string(),
            convert_timeout_secs: 1,
        });

        let ok = decoder
            .convert(Path::new("/tmp/in.webm"), Path::new("/tmp/out.wav"))
            .await;
        assert!(!ok);
    }
}
