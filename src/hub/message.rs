use serde::{Deserialize, Serialize};

use crate::stt::{epoch_millis, wall_clock_time};

/// Message kinds on the viewer wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Session lifecycle notice
    Status,
    /// Finished utterance
    Final,
    /// In-progress utterance that a later final replaces
    Interim,
}

impl MessageKind {
    /// Whether late joiners get this kind replayed.
    pub fn is_replayed(self) -> bool {
        matches!(self, MessageKind::Status | MessageKind::Final)
    }
}

/// One unit of fan-out, immutable once built.
///
/// Wire shape: `{type, text, time, lang, ts, translated?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,

    pub text: String,

    /// `mm:ss` session time or `HH:MM:SS` wall-clock time
    pub time: String,

    pub lang: String,

    /// Wall-clock milliseconds at construction
    pub ts: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,
}

impl BroadcastMessage {
    pub fn new(kind: MessageKind, text: impl Into<String>, time: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            time: time.into(),
            lang: lang.into(),
            ts: epoch_millis(),
            translated: None,
        }
    }

    /// Status notice stamped with the current wall-clock time.
    pub fn status(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::new(MessageKind::Status, text, wall_clock_time(), lang)
    }

    pub fn with_translation(mut self, translated: Option<String>) -> Self {
        self.translated = translated;
        self
    }
}
