use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::ProtocolError;
use crate::hub::{BroadcastMessage, MessageKind};
use crate::language::language_or;
use crate::session::Pipeline;
use crate::stt::wall_clock_time;

/// Validate and normalize one client recognition event.
///
/// `Ok(None)` means the event is well-formed but carries no text.
pub fn parse_client_event(
    raw: &str,
    primary_language: &str,
) -> Result<Option<BroadcastMessage>, ProtocolError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| ProtocolError::InvalidJson)?;
    let event = value.as_object().ok_or(ProtocolError::InvalidJson)?;

    let kind = match event.get("type").and_then(Value::as_str) {
        Some("final") => MessageKind::Final,
        Some("interim") => MessageKind::Interim,
        _ => return Err(ProtocolError::InvalidKind),
    };

    let text = field_text(event.get("text"));
    if text.is_empty() {
        return Ok(None);
    }

    let time = field_text(event.get("time"));
    let time = if time.is_empty() { wall_clock_time() } else { time };

    let lang_tag = field_text(event.get("lang"));
    let lang = language_or(Some(lang_tag.as_str()), primary_language);

    Ok(Some(BroadcastMessage::new(kind, text, time, lang)))
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Ingest for clients running their own recognizer.
#[derive(Clone)]
pub struct SenderIngest {
    pipeline: Arc<Pipeline>,
}

impl SenderIngest {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Handle one text frame. Returns whether anything was published.
    pub async fn handle_text(&self, raw: &str) -> Result<bool, ProtocolError> {
        let primary = &self.pipeline.config.primary_language;
        let Some(mut message) = parse_client_event(raw, primary)? else {
            return Ok(false);
        };

        if message.kind == MessageKind::Final {
            message.translated = self
                .pipeline
                .enricher
                .maybe_translate(&message.text, &message.lang)
                .await;
        }

        debug!(kind = ?message.kind, lang = %message.lang, "Client event accepted");
        self.pipeline.hub.publish(message).await;
        Ok(true)
    }
}
