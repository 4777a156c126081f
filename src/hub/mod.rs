//! Broadcast hub: viewer registry, bounded replay and fan-out

#[allow(clippy::module_inception)]
mod hub;
mod message;

pub use hub::{BroadcastHub, Frame, ReplayBuffer, Viewer};
pub use message::{BroadcastMessage, MessageKind};
