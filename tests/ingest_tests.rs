// Integration tests for the push-side ingest paths
//
// Sender clients publish their own recognition events; audio senders push
// compressed blobs that are converted and transcribed one at a time.

mod common;

use anyhow::Result;
use common::*;
use livestt::error::ProtocolError;
use livestt::hub::MessageKind;
use livestt::ingest::{AudioPushIngest, SenderIngest};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

fn harness(decoder: FakeDecoder, language: &str) -> Harness {
    Harness::new(
        Arc::new(FixedResolver::new("unused")),
        decoder,
        ScriptedEngine::new(language),
    )
}

#[tokio::test]
async fn test_sender_final_is_translated_and_published() -> Result<()> {
    let h = harness(FakeDecoder::blocking(), "ko");
    let sender = SenderIngest::new(Arc::clone(&h.pipeline));
    let mut viewer = h.hub().register().await;

    let published = sender
        .handle_text(r#"{"type":"final","text":"good morning","time":"09:00:00","lang":"en"}"#)
        .await?;
    assert!(published);

    let messages = drain(&mut viewer);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::Final);
    assert_eq!(messages[0].time, "09:00:00");
    assert_eq!(messages[0].translated.as_deref(), Some("[ko] good morning"));

    Ok(())
}

#[tokio::test]
async fn test_sender_interim_is_fanned_out_but_not_replayed() -> Result<()> {
    let h = harness(FakeDecoder::blocking(), "ko");
    let sender = SenderIngest::new(Arc::clone(&h.pipeline));
    let mut viewer = h.hub().register().await;

    sender
        .handle_text(r#"{"type":"interim","text":"good mor","lang":"en"}"#)
        .await?;

    let messages = drain(&mut viewer);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::Interim);
    assert!(messages[0].translated.is_none());
    assert_eq!(h.translator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.hub().replay_len().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_sender_rejections_publish_nothing() -> Result<()> {
    let h = harness(FakeDecoder::blocking(), "ko");
    let sender = SenderIngest::new(Arc::clone(&h.pipeline));
    let mut viewer = h.hub().register().await;

    assert_eq!(
        sender.handle_text("not json").await,
        Err(ProtocolError::InvalidJson)
    );
    assert_eq!(
        sender.handle_text(r#"{"type":"status","text":"x"}"#).await,
        Err(ProtocolError::InvalidKind)
    );
    assert_eq!(
        sender.handle_text(r#"{"type":"final","text":""}"#).await,
        Ok(false)
    );

    assert!(drain(&mut viewer).is_empty());

    Ok(())
}

#[tokio::test]
async fn test_audio_blob_is_transcribed_with_wall_clock_time() -> Result<()> {
    let scratch = TempDir::new()?;
    let h = harness(FakeDecoder::blocking(), "en");
    let ingest = AudioPushIngest::new(Arc::clone(&h.pipeline), scratch.path());
    let mut viewer = h.hub().register().await;

    let connection = ingest.connection();
    let published = connection.handle_blob(b"compressed audio").await;
    assert_eq!(published, 1);

    // One second of converted audio reaches the engine
    assert_eq!(h.engine.calls(), vec![32_000]);

    let messages = drain(&mut viewer);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::Final);
    assert_eq!(messages[0].time.len(), "HH:MM:SS".len());
    assert_eq!(messages[0].translated.as_deref(), Some("[ko] window 0"));

    Ok(())
}

#[tokio::test]
async fn test_audio_conversion_failure_skips_blob() -> Result<()> {
    let scratch = TempDir::new()?;
    let h = harness(FakeDecoder::blocking().failing_conversion(), "ko");
    let ingest = AudioPushIngest::new(Arc::clone(&h.pipeline), scratch.path());
    let mut viewer = h.hub().register().await;

    let connection = ingest.connection();
    assert_eq!(connection.handle_blob(b"garbage").await, 0);
    assert_eq!(connection.handle_blob(b"more garbage").await, 0);

    assert!(h.engine.calls().is_empty());
    assert!(drain(&mut viewer).is_empty());

    Ok(())
}

#[tokio::test]
async fn test_audio_scratch_files_removed_on_close() -> Result<()> {
    let scratch = TempDir::new()?;
    let h = harness(FakeDecoder::blocking(), "ko");
    let ingest = AudioPushIngest::new(Arc::clone(&h.pipeline), scratch.path());

    let connection = ingest.connection();
    connection.handle_blob(b"compressed audio").await;

    let paths: Vec<_> = connection
        .scratch_paths()
        .iter()
        .map(|p| p.to_path_buf())
        .collect();
    assert!(paths.iter().all(|p| p.exists()));

    drop(connection);
    assert!(paths.iter().all(|p| !p.exists()));

    Ok(())
}

#[tokio::test]
async fn test_audio_connections_use_distinct_scratch_files() -> Result<()> {
    let scratch = TempDir::new()?;
    let h = harness(FakeDecoder::blocking(), "ko");
    let ingest = AudioPushIngest::new(Arc::clone(&h.pipeline), scratch.path());

    let a = ingest.connection();
    let b = ingest.connection();
    assert_ne!(a.scratch_paths(), b.scratch_paths());

    let (pa, pb) = tokio::join!(a.handle_blob(b"one"), b.handle_blob(b"two"));
    assert_eq!(pa + pb, 2);
    assert_eq!(h.hub().replay_len().await, 2);

    Ok(())
}
