use crate::config::{AllowedOrigins, RelayConfig};
use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use stockfish_session::{EngineError, EngineSession, SessionState, STARTING_FEN};
use tokio::sync::Mutex;
use tower_http::cors::{self, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// The one engine process, shared by every request
pub type SharedEngine = Arc<Mutex<EngineSession>>;

#[derive(Clone)]
pub struct AppState {
    engine: SharedEngine,
    move_time: Duration,
}

#[derive(Debug, Default, Deserialize)]
pub struct MoveRequest {
    // Absent or null means the starting position
    #[serde(default)]
    pub fen: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub best_move: Option<String>,
    /// Seconds from loading the position to receiving the move
    pub calculation_time: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine: SessionState,
}

pub fn router(engine: SharedEngine, config: &RelayConfig) -> Router {
    let state = AppState {
        engine,
        move_time: config.move_time,
    };

    Router::new()
        .route("/get-move", post(get_move).options(preflight))
        .route("/health", get(health))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match origins {
        AllowedOrigins::Any => layer.allow_origin(cors::Any),
        AllowedOrigins::List(list) => layer.allow_origin(AllowOrigin::list(list.iter().cloned())),
    }
}

async fn get_move(
    State(state): State<AppState>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, ApiError> {
    let Json(request) = payload?;
    let fen = request.fen.unwrap_or_else(|| STARTING_FEN.to_string());

    // Detached so a client hanging up cannot abandon the engine mid-conversation
    let engine = Arc::clone(&state.engine);
    let budget = state.move_time;
    let search = tokio::spawn(async move {
        let mut session = engine.lock().await;
        let started = Instant::now();
        let best_move = session.search(&fen, budget).await?;
        Ok::<_, EngineError>((fen, best_move, started.elapsed()))
    });

    let (fen, best_move, elapsed) = search.await??;
    info!(
        %fen,
        best_move = best_move.as_deref().unwrap_or("(none)"),
        elapsed_ms = elapsed.as_millis() as u64,
        "Move computed"
    );

    Ok(Json(MoveResponse {
        best_move,
        calculation_time: elapsed.as_secs_f64(),
    }))
}

/// Pre-flight requests that reach the handler get an empty 200
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    // A held lock means a search is running, which is healthy
    let engine = match state.engine.try_lock() {
        Ok(mut session) => session.refresh_state(),
        Err(_) => SessionState::Searching,
    };

    let (code, status) = match engine {
        SessionState::Ready | SessionState::Searching => (StatusCode::OK, "ok"),
        SessionState::Uninitialized | SessionState::Unavailable => {
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (code, Json(HealthResponse { status, engine }))
}
