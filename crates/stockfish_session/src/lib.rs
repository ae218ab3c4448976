//! Engine session over the UCI protocol
//!
//! Spawns an external UCI engine (Stockfish by default), applies fixed
//! strength settings once, and answers "best move for this FEN" queries.
//!
//! ```rust,ignore
//! let mut session = EngineSession::start(EngineConfig::default()).await?;
//! let best = session.search(STARTING_FEN, Duration::from_secs(1)).await?;
//! ```

pub mod config;
pub mod error;
pub mod fen;
#[cfg(feature = "mock-engine")]
pub mod mock;
pub mod process;
pub mod protocol;
pub mod session;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use fen::{Fen, STARTING_FEN};
pub use session::{EngineSession, SessionState};
