//! Long-lived engine session
//!
//! One [`EngineSession`] owns one engine process for the lifetime of the
//! service. It is configured once, then reset to a new position per search.
//!
//! # States
//!
//! ```text
//! Uninitialized ──start──▶ Ready ──go──▶ Searching ──bestmove──▶ Ready
//!                            │                │
//!                            └──── crash ─────┴──▶ Unavailable
//! ```
//!
//! The next call after a crash spawns a fresh process with the same
//! configuration. Only one restart is attempted per failure: if it fails,
//! the session stays unavailable for good. A completed search re-arms the
//! restart for the next failure.
//!
//! The session is not internally synchronised. Callers share it behind a
//! mutex and hold the lock across [`EngineSession::set_position`] and
//! [`EngineSession::best_move`] (or just call [`EngineSession::search`]).

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::fen::Fen;
use crate::process::UciProcess;
use crate::protocol::{EngineLine, GuiCommand};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Ready,
    Searching,
    Unavailable,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Searching => "searching",
            Self::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

/// Handle to one external engine process
pub struct EngineSession {
    config: EngineConfig,
    process: Option<UciProcess>,
    state: SessionState,
    configured: bool,
    restart_spent: bool,
    engine_name: Option<String>,
}

impl EngineSession {
    /// An unstarted session; call [`Self::launch`] and [`Self::configure`] next
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            process: None,
            state: SessionState::Uninitialized,
            configured: false,
            restart_spent: false,
            engine_name: None,
        }
    }

    /// Spawn the engine and apply the strength settings from `config`
    pub async fn start(config: EngineConfig) -> EngineResult<Self> {
        let (depth, skill_level, threads) = (config.depth, config.skill_level, config.threads);
        let mut session = Self::new(config);
        session.launch().await?;
        session.configure(depth, skill_level, threads).await?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current state, noticing a process that exited since the last call
    pub fn refresh_state(&mut self) -> SessionState {
        let exited = self.process.as_mut().is_some_and(|p| p.has_exited());
        if exited && self.state == SessionState::Ready {
            warn!("Engine process exited while idle");
            self.mark_unavailable();
        }
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name the engine reported in its `id name` line
    pub fn engine_name(&self) -> Option<&str> {
        self.engine_name.as_deref()
    }

    /// Spawn the process and run the `uci`/`uciok` handshake
    pub async fn launch(&mut self) -> EngineResult<()> {
        let mut process = UciProcess::spawn(&self.config)?;

        process.send(&GuiCommand::Uci).await?;
        let mut name = None;
        let handshake = process.read_until(|line| match line {
            EngineLine::IdName(id) => {
                name = Some(id);
                None
            }
            EngineLine::UciOk => Some(()),
            _ => None,
        });
        match timeout(self.config.handshake_timeout, handshake).await {
            Ok(result) => result?,
            Err(_) => return Err(EngineError::unavailable("engine did not answer 'uci'")),
        }

        info!(
            engine = name.as_deref().unwrap_or("unknown"),
            pid = process.pid(),
            "Engine handshake complete"
        );
        self.engine_name = name;
        self.process = Some(process);
        Ok(())
    }

    /// Apply the fixed strength parameters; allowed once per session
    pub async fn configure(
        &mut self,
        depth: u32,
        skill_level: u8,
        threads: u32,
    ) -> EngineResult<()> {
        if self.configured {
            return Err(EngineError::AlreadyConfigured);
        }

        self.config = self
            .config
            .clone()
            .with_strength(depth, skill_level, threads);
        self.apply_options().await?;
        self.configured = true;
        self.state = SessionState::Ready;

        info!(
            depth = self.config.depth,
            skill_level = self.config.skill_level,
            threads = self.config.threads,
            "Engine configured"
        );
        Ok(())
    }

    /// Reset the engine to `fen`
    pub async fn set_position(&mut self, fen: &str) -> EngineResult<()> {
        let fen = Fen::parse(fen)?;
        self.ensure_ready().await?;

        let loaded = self.load_position(&fen).await;
        match loaded {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => {
                error!(%fen, "Engine died while loading position: {e}");
                self.mark_unavailable();
                if let Err(restart) = self.restart().await {
                    warn!("Engine restart after position crash failed: {restart}");
                }
                Err(EngineError::invalid_position(format!(
                    "engine rejected position '{fen}'"
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Search the current position for at most `budget`
    ///
    /// Returns `None` when the side to move has no legal moves.
    pub async fn best_move(&mut self, budget: Duration) -> EngineResult<Option<String>> {
        if self.state != SessionState::Ready {
            return Err(EngineError::unavailable(format!(
                "engine is {}, cannot search",
                self.state
            )));
        }

        self.state = SessionState::Searching;
        let result = self.run_search(budget).await;
        match &result {
            Err(e) if e.is_fatal() => {
                error!("Search failed: {e}");
                self.mark_unavailable();
            }
            Err(_) => self.state = SessionState::Ready,
            Ok(_) => {
                self.state = SessionState::Ready;
                self.restart_spent = false;
            }
        }
        result
    }

    /// `set_position` followed by `best_move`
    pub async fn search(&mut self, fen: &str, budget: Duration) -> EngineResult<Option<String>> {
        self.set_position(fen).await?;
        self.best_move(budget).await
    }

    /// Quit the engine process
    pub async fn shutdown(mut self) {
        if let Some(process) = self.process.take() {
            process.shutdown(self.config.watchdog_grace).await;
        }
        self.state = SessionState::Unavailable;
    }

    async fn apply_options(&mut self) -> EngineResult<()> {
        let options = [
            GuiCommand::set_option("Threads", self.config.threads),
            GuiCommand::set_option("Hash", self.config.hash_mb),
            GuiCommand::set_option("Skill Level", self.config.skill_level),
        ];
        for option in &options {
            self.process_mut()?.send(option).await?;
        }
        self.sync().await
    }

    async fn load_position(&mut self, fen: &Fen) -> EngineResult<()> {
        let process = self.process_mut()?;
        process.send(&GuiCommand::UciNewGame).await?;
        process.send(&GuiCommand::Position(fen.clone())).await?;
        self.sync().await?;
        debug!(%fen, "Position loaded");
        Ok(())
    }

    async fn run_search(&mut self, budget: Duration) -> EngineResult<Option<String>> {
        let depth = self.config.depth;
        let grace = self.config.watchdog_grace;
        let process = self.process_mut()?;

        process
            .send(&GuiCommand::Go {
                depth,
                movetime: budget,
            })
            .await?;

        if let Ok(result) = timeout(budget + grace, read_best_move(process)).await {
            return result;
        }

        warn!(?budget, "Engine overran its move time, sending stop");
        process.send(&GuiCommand::Stop).await?;
        match timeout(grace, read_best_move(process)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::unavailable(
                "engine did not answer 'stop' with a move",
            )),
        }
    }

    /// `isready` / `readyok` round trip
    async fn sync(&mut self) -> EngineResult<()> {
        let wait = self.config.handshake_timeout;
        let process = self.process_mut()?;
        process.send(&GuiCommand::IsReady).await?;
        let ready = process.read_until(|line| matches!(line, EngineLine::ReadyOk).then_some(()));
        match timeout(wait, ready).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::unavailable("engine did not answer 'isready'")),
        }
    }

    async fn ensure_ready(&mut self) -> EngineResult<()> {
        if self.state == SessionState::Ready
            && self.process.as_mut().is_some_and(|p| !p.has_exited())
        {
            return Ok(());
        }

        match self.state {
            SessionState::Uninitialized => {
                Err(EngineError::unavailable("engine session was never started"))
            }
            _ => {
                self.mark_unavailable();
                self.restart().await
            }
        }
    }

    async fn restart(&mut self) -> EngineResult<()> {
        if self.restart_spent {
            return Err(EngineError::unavailable(
                "engine process is gone and its restart was already used",
            ));
        }
        self.restart_spent = true;

        warn!("Restarting engine process");
        let relaunched = async {
            self.launch().await?;
            self.apply_options().await
        }
        .await;

        match relaunched {
            Ok(()) => {
                self.state = SessionState::Ready;
                info!("Engine restarted");
                Ok(())
            }
            Err(e) => {
                error!("Engine restart failed: {e}");
                self.mark_unavailable();
                Err(e)
            }
        }
    }

    fn mark_unavailable(&mut self) {
        // Dropping the process kills it
        self.process = None;
        self.state = SessionState::Unavailable;
    }

    fn process_mut(&mut self) -> EngineResult<&mut UciProcess> {
        self.process
            .as_mut()
            .ok_or_else(|| EngineError::unavailable("no engine process"))
    }
}

async fn read_best_move(process: &mut UciProcess) -> EngineResult<Option<String>> {
    process
        .read_until(|line| match line {
            EngineLine::BestMove(best) => Some(best),
            _ => None,
        })
        .await
}
