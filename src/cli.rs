//! Command-line and environment configuration
//!
//! Every flag has an environment fallback; `main` loads `.env` first so the
//! file can supply any of them.

use backend::{AllowedOrigins, RelayConfig};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use stockfish_session::config::MAX_SKILL_LEVEL;
use stockfish_session::EngineConfig;

#[derive(Parser, Debug)]
#[command(name = "stockfish-relay", version, about = "HTTP relay to a UCI chess engine")]
pub struct Cli {
    /// Address the HTTP server listens on
    #[arg(long, env = "RELAY_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Engine binary
    #[arg(long, env = "STOCKFISH_PATH", default_value = "/usr/bin/stockfish")]
    pub engine_path: PathBuf,

    /// Search depth limit in plies
    #[arg(long, env = "ENGINE_DEPTH", default_value_t = 8)]
    pub depth: u32,

    /// Engine skill level (0-20)
    #[arg(
        long,
        env = "ENGINE_SKILL_LEVEL",
        default_value_t = 10,
        value_parser = clap::value_parser!(u8).range(0..=MAX_SKILL_LEVEL as i64)
    )]
    pub skill_level: u8,

    /// Search threads
    #[arg(long, env = "ENGINE_THREADS", default_value_t = 4)]
    pub threads: u32,

    /// Transposition table size in MB
    #[arg(long, env = "ENGINE_HASH_MB", default_value_t = 16)]
    pub hash_mb: u32,

    /// Time budget per move in milliseconds
    #[arg(long, env = "MOVE_TIME_MS", default_value_t = 18_000)]
    pub move_time_ms: u64,

    /// Comma-separated browser origins allowed to call the API, `*` for any
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "http://localhost:3000")]
    pub allowed_origins: AllowedOrigins,
}

impl Cli {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(&self.engine_path)
            .with_strength(self.depth, self.skill_level, self.threads)
            .with_hash_mb(self.hash_mb)
    }

    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            move_time: Duration::from_millis(self.move_time_ms),
            allowed_origins: self.allowed_origins.clone(),
        }
    }
}
