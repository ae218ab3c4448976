//! Scripted stand-in engine for tests
//!
//! A POSIX `sh` script that speaks enough UCI to exercise the session and
//! the HTTP layer without a real Stockfish binary. Its answers depend on the
//! position it was given:
//!
//! | position contains | behaviour on `go`                      |
//! |-------------------|----------------------------------------|
//! | `6Q1/6K1`         | `bestmove (none)` (black is mated)     |
//! | `3QK3`            | stays silent until `stop`, then `d1d8` |
//! | black to move     | `bestmove e7e5`                        |
//! | anything else     | `bestmove e2e4 ponder e7e5`            |
//!
//! A position containing `K6k` makes the script exit with status 3 as soon
//! as it reads the `position` line. A position containing `K5k1` is loaded
//! normally, but the script exits right after answering the next `isready`.
//!
//! [`single_launch_engine_config`] passes a marker path to the script. A
//! crash creates the marker, and a script started while it exists quits
//! before the handshake, so the restart after a crash fails.

use crate::config::EngineConfig;
use std::path::Path;
use std::time::Duration;

/// Mated position: black king h8, white queen g7 and king g6
pub const MATED_FEN: &str = "7k/6Q1/6K1/8/8/8/8/8 b - - 0 1";
/// Shape-valid position the mock crashes on
pub const CRASHING_FEN: &str = "8/8/8/8/8/8/8/K6k w - - 0 1";
/// Shape-valid position after which the mock exits while idle
pub const DYING_FEN: &str = "8/8/8/8/8/8/8/K5k1 w - - 0 1";
/// Position the mock never answers on its own
pub const STALLING_FEN: &str = "4k3/8/8/8/8/8/8/3QK3 w - - 0 1";
/// Black-to-move position after 1. e4
pub const BLACK_TO_MOVE_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";

const SCRIPT: &str = r#"
marker="$1"
if [ -n "$marker" ] && [ -e "$marker" ]; then
  exit 1
fi
fen=""
stalled=0
dying=0
while IFS= read -r line; do
  case "$line" in
    uci)
      echo "id name MockFish"
      echo "id author relay tests"
      echo "option name Threads type spin default 1 min 1 max 512"
      echo "uciok"
      ;;
    isready)
      echo "readyok"
      if [ "$dying" = 1 ]; then
        exit 4
      fi
      ;;
    "position fen "*)
      fen="${line#position fen }"
      case "$fen" in
        *K6k*)
          if [ -n "$marker" ]; then
            : > "$marker"
          fi
          exit 3
          ;;
        *K5k1*) dying=1 ;;
      esac
      ;;
    go*)
      case "$fen" in
        *6Q1/6K1*)
          echo "info depth 0 score mate 0"
          echo "bestmove (none)"
          ;;
        *3QK3*)
          stalled=1
          ;;
        *" b "*)
          echo "info depth 1 score cp -20 pv e7e5"
          echo "bestmove e7e5"
          ;;
        *)
          echo "info depth 1 score cp 20 pv e2e4 e7e5"
          echo "bestmove e2e4 ponder e7e5"
          ;;
      esac
      ;;
    stop)
      if [ "$stalled" = 1 ]; then
        stalled=0
        echo "bestmove d1d8"
      fi
      ;;
    quit)
      exit 0
      ;;
  esac
done
"#;

/// Config that runs the scripted engine through `sh -c`
pub fn mock_engine_config() -> EngineConfig {
    EngineConfig::new("sh")
        .with_args(["-c", SCRIPT])
        .with_handshake_timeout(Duration::from_secs(5))
        .with_watchdog_grace(Duration::from_millis(200))
}

/// Like [`mock_engine_config`], but the engine cannot be started again once
/// it has crashed; `marker` must not exist yet
pub fn single_launch_engine_config(marker: &Path) -> EngineConfig {
    let marker = marker.to_string_lossy().into_owned();
    mock_engine_config().with_args(["-c", SCRIPT, "mockfish", marker.as_str()])
}
