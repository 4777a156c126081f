// In-process stand-ins for the external collaborators, so pipeline behaviour
// can be checked without ffmpeg, yt-dlp or a network.

#![allow(dead_code)]

use async_trait::async_trait;
use livestt::audio::{encode_samples, encode_wav, DecodeProcess, Decoder, Terminate};
use livestt::error::{PipelineError, Result};
use livestt::hub::{BroadcastHub, BroadcastMessage, MessageKind, Viewer};
use livestt::resolve::{MediaResolver, StreamInfo};
use livestt::session::{Pipeline, SessionConfig, SessionController, SessionState};
use livestt::stt::{SegmentTranscriber, TranscriptSegment, TranscriptionEngine};
use livestt::enrich::{Enricher, Translator};
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Bytes of PCM per second of canonical audio.
pub const BYTES_PER_SEC: usize = 32000;

pub fn silence_pcm(secs: f64) -> Vec<u8> {
    vec![0u8; (secs * BYTES_PER_SEC as f64) as usize]
}

// ============================================================================
// Engine
// ============================================================================

/// Returns one segment per call and records the PCM length of every buffer.
pub struct ScriptedEngine {
    pub pcm_lengths: Mutex<Vec<usize>>,
    language: String,
    fail_on_call: Option<usize>,
}

impl ScriptedEngine {
    pub fn new(language: &str) -> Self {
        Self {
            pcm_lengths: Mutex::new(Vec::new()),
            language: language.to_string(),
            fail_on_call: None,
        }
    }

    /// Fail the `n`th call (0-indexed).
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<usize> {
        self.pcm_lengths.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptionEngine for ScriptedEngine {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<Vec<TranscriptSegment>> {
        let call = {
            let mut lengths = self.pcm_lengths.lock().unwrap();
            lengths.push(wav.len() - livestt::audio::WAV_HEADER_BYTES);
            lengths.len() - 1
        };

        if self.fail_on_call == Some(call) {
            return Err(PipelineError::Engine {
                message: "scripted failure".to_string(),
            });
        }

        Ok(vec![TranscriptSegment {
            text: format!("window {}", call),
            start_secs: 1.0,
            end_secs: 2.0,
            language: self.language.clone(),
        }])
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// Blocks every read until terminated, then reports end of stream.
#[derive(Clone, Default)]
pub struct Gate {
    released: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    fn release(&self) {
        let (lock, cvar) = &*self.released;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }
}

impl Read for Gate {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        let (lock, cvar) = &*self.released;
        let mut released = lock.lock().unwrap();
        while !*released {
            released = cvar.wait(released).unwrap();
        }
        Ok(0)
    }
}

struct GateHandle {
    gate: Gate,
    terminations: Arc<AtomicUsize>,
}

impl Terminate for GateHandle {
    fn terminate(self: Box<Self>) {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        self.gate.release();
    }
}

struct CountingHandle {
    terminations: Arc<AtomicUsize>,
}

impl Terminate for CountingHandle {
    fn terminate(self: Box<Self>) {
        self.terminations.fetch_add(1, Ordering::SeqCst);
    }
}

enum StreamScript {
    /// Canonical WAV bytes served from memory
    Bytes(Vec<u8>),
    /// Never produces data until terminated
    Blocking,
}

/// Decoder whose stream and conversions are scripted.
pub struct FakeDecoder {
    script: StreamScript,
    convert_ok: bool,
    pub spawned: AtomicUsize,
    pub terminations: Arc<AtomicUsize>,
}

impl FakeDecoder {
    /// Serves `pcm` behind a canonical header.
    pub fn with_pcm(pcm: &[u8]) -> Self {
        Self::new(StreamScript::Bytes(
            encode_wav(pcm).expect("encode test stream"),
        ))
    }

    pub fn blocking() -> Self {
        Self::new(StreamScript::Blocking)
    }

    fn new(script: StreamScript) -> Self {
        Self {
            script,
            convert_ok: true,
            spawned: AtomicUsize::new(0),
            terminations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_conversion(mut self) -> Self {
        self.convert_ok = false;
        self
    }

    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Decoder for FakeDecoder {
    async fn spawn(&self, _endpoint: &str) -> Result<DecodeProcess> {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        let terminations = Arc::clone(&self.terminations);

        Ok(match &self.script {
            StreamScript::Bytes(bytes) => DecodeProcess::new(
                Cursor::new(bytes.clone()),
                CountingHandle { terminations },
            ),
            StreamScript::Blocking => {
                let gate = Gate::default();
                DecodeProcess::new(gate.clone(), GateHandle { gate, terminations })
            }
        })
    }

    async fn convert(&self, _input: &Path, output: &Path) -> bool {
        if !self.convert_ok {
            return false;
        }
        // One second of canonical silence.
        let wav = encode_samples(&vec![0i16; 16000]).expect("encode converted file");
        std::fs::write(output, wav).is_ok()
    }
}

// ============================================================================
// Resolver and translator
// ============================================================================

pub struct FixedResolver {
    pub title: String,
    pub is_live: bool,
}

impl FixedResolver {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            is_live: false,
        }
    }
}

#[async_trait]
impl MediaResolver for FixedResolver {
    async fn resolve(&self, locator: &str) -> Result<StreamInfo> {
        Ok(StreamInfo {
            endpoint: format!("memory://{}", locator),
            title: self.title.clone(),
            is_live: self.is_live,
            duration_secs: None,
        })
    }
}

pub struct FailingResolver;

#[async_trait]
impl MediaResolver for FailingResolver {
    async fn resolve(&self, _locator: &str) -> Result<StreamInfo> {
        Err(PipelineError::Resolution {
            message: "no audio stream".to_string(),
        })
    }
}

/// Prefixes the target language and counts calls, optionally after a delay.
#[derive(Default)]
pub struct RecordingTranslator {
    pub calls: AtomicUsize,
    delay: Duration,
}

impl RecordingTranslator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(format!("[{}] {}", target_language, text))
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub engine: Arc<ScriptedEngine>,
    pub decoder: Arc<FakeDecoder>,
    pub translator: Arc<RecordingTranslator>,
    pub pipeline: Arc<Pipeline>,
    pub controller: Arc<SessionController>,
}

impl Harness {
    pub fn new(
        resolver: Arc<dyn MediaResolver>,
        decoder: FakeDecoder,
        engine: ScriptedEngine,
    ) -> Self {
        Self::with_translation_delay(resolver, decoder, engine, Duration::ZERO)
    }

    pub fn with_translation_delay(
        resolver: Arc<dyn MediaResolver>,
        decoder: FakeDecoder,
        engine: ScriptedEngine,
        delay: Duration,
    ) -> Self {
        let engine = Arc::new(engine);
        let decoder = Arc::new(decoder);
        let translator = Arc::new(RecordingTranslator {
            calls: AtomicUsize::new(0),
            delay,
        });
        let config = SessionConfig::default();

        let pipeline = Arc::new(Pipeline {
            resolver,
            decoder: decoder.clone(),
            transcriber: SegmentTranscriber::new(engine.clone(), config.primary_language.clone()),
            enricher: Enricher::new(translator.clone(), config.primary_language.clone()),
            hub: BroadcastHub::new(500),
            config,
        });

        Self {
            engine,
            decoder,
            translator,
            controller: Arc::new(SessionController::new(Arc::clone(&pipeline))),
            pipeline,
        }
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.pipeline.hub
    }

    /// Poll until the session is idle again.
    pub async fn wait_idle(&self) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while self.controller.state() != SessionState::Idle {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("session did not finish");
    }
}

/// Receive until a message with `text` arrives, returning everything seen.
pub async fn recv_until(viewer: &mut Viewer, text: &str) -> Vec<BroadcastMessage> {
    let mut seen = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(frame) = viewer.recv().await {
            let done = frame.message.text == text;
            seen.push((*frame.message).clone());
            if done {
                break;
            }
        }
    })
    .await
    .expect("message never arrived");
    seen
}

/// Everything already queued for `viewer`.
pub fn drain(viewer: &mut Viewer) -> Vec<BroadcastMessage> {
    std::iter::from_fn(|| viewer.try_recv())
        .map(|frame| (*frame.message).clone())
        .collect()
}

pub fn texts(messages: &[BroadcastMessage], kind: MessageKind) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.kind == kind)
        .map(|m| m.text.clone())
        .collect()
}
