//! HTTP front for the engine session
//!
//! `POST /get-move` relays a FEN to the shared [`stockfish_session::EngineSession`]
//! and answers with the engine's move and the time it took.

pub mod api;
pub mod config;
pub mod error;

pub use api::{router, SharedEngine};
pub use config::{AllowedOrigins, RelayConfig};
pub use error::ApiError;
