//! Push-side ingest: client audio blobs and client-side recognition events

mod audio_push;
mod sender;

pub use audio_push::{AudioPushConnection, AudioPushIngest};
pub use sender::{parse_client_event, SenderIngest};
