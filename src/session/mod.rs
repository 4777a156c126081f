//! URL-pull session management
//!
//! This module provides the single-flight `SessionController` that drives:
//! - Locator resolution and decoder startup
//! - Fixed-size windowing of the decoded stream
//! - Per-window transcription, timestamping and translation
//! - Publishing to the broadcast hub, with a final status on every exit path

mod config;
mod pipeline;
#[allow(clippy::module_inception)]
mod session;
mod state;
mod stats;

pub use config::SessionConfig;
pub use pipeline::Pipeline;
pub use session::SessionController;
pub use state::{SessionOutcome, SessionState};
pub use stats::{SessionStatus, StatusBoard};
