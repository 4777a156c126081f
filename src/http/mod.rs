//! HTTP API server and WebSocket fan-out
//!
//! This module provides the control surface and the role-multiplexed socket:
//! - POST /api/start - Start a URL-pull session
//! - POST /api/stop - Stop the session
//! - GET /api/status - Query session and hub status
//! - POST /api/summary - Summarize transcript lines
//! - GET /ws?role= - Viewer, sender or audio sender connection
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;
mod ws;

pub use routes::create_router;
pub use state::AppState;
pub use ws::{ConnectionRole, RoleHandler};
