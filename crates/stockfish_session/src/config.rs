//! Engine strength and process settings
//!
//! Built once at startup and handed to [`crate::EngineSession::start`].
//! Nothing in here changes per request.

use std::path::PathBuf;
use std::time::Duration;

/// Highest `Skill Level` Stockfish accepts
pub const MAX_SKILL_LEVEL: u8 = 20;

/// Fixed engine parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Path to the engine binary
    pub path: PathBuf,
    /// Extra arguments passed to the engine on spawn
    pub args: Vec<String>,
    /// Maximum search depth in plies, sent with every `go`
    pub depth: u32,
    /// `Skill Level` option, 0..=20
    pub skill_level: u8,
    /// `Threads` option
    pub threads: u32,
    /// `Hash` option in MB
    pub hash_mb: u32,
    /// How long the `uci`/`isready` handshakes may take
    pub handshake_timeout: Duration,
    /// Slack added on top of the move-time budget before the watchdog fires
    pub watchdog_grace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/usr/bin/stockfish"),
            args: Vec::new(),
            depth: 8,
            skill_level: 10,
            threads: 4,
            hash_mb: 16,
            handshake_timeout: Duration::from_secs(10),
            watchdog_grace: Duration::from_secs(2),
        }
    }
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set depth, skill level and thread count together
    pub fn with_strength(mut self, depth: u32, skill_level: u8, threads: u32) -> Self {
        self.depth = depth;
        self.skill_level = skill_level.min(MAX_SKILL_LEVEL);
        self.threads = threads.max(1);
        self
    }

    pub fn with_hash_mb(mut self, hash_mb: u32) -> Self {
        self.hash_mb = hash_mb.max(1);
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_watchdog_grace(mut self, grace: Duration) -> Self {
        self.watchdog_grace = grace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_relay_settings() {
        let config = EngineConfig::default();
        assert_eq!(config.path, PathBuf::from("/usr/bin/stockfish"));
        assert_eq!(config.depth, 8);
        assert_eq!(config.skill_level, 10);
        assert_eq!(config.threads, 4);
    }

    #[test]
    fn test_strength_is_clamped() {
        let config = EngineConfig::new("stockfish").with_strength(12, 42, 0);
        assert_eq!(config.depth, 12);
        assert_eq!(config.skill_level, MAX_SKILL_LEVEL);
        assert_eq!(config.threads, 1);
    }
}
