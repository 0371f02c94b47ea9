//! HTTP control surface
//!
//! Thin synchronous wrappers over the same pipeline pieces the autonomous
//! loop uses. `/command` goes through the identical `Dispatcher::dispatch`
//! contract, so there is no duplicated matching logic.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::audio::{samples_to_wav, AudioCapture, AudioPlayback, BandpassFilter, SAMPLE_RATE};
use crate::device::DeviceCommandSink;
use crate::dispatch::Dispatcher;
use crate::speech::{SpeechToText, TextToSpeech};
use crate::{Config, Result};

/// Shared state for API handlers
pub struct ApiState {
    dispatcher: Dispatcher,
    filter: BandpassFilter,
    stt: SpeechToText,
    tts: TextToSpeech,
    sink: DeviceCommandSink,
    capture_duration: Duration,
}

impl ApiState {
    /// Build API state from config
    ///
    /// # Errors
    ///
    /// Returns error if service credentials or the filter spec are invalid
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::from_profile(&config.profile),
            filter: BandpassFilter::new(config.filter)?,
            stt: SpeechToText::new(&config.stt, config.profile.language.clone())?,
            tts: TextToSpeech::new(&config.tts, config.profile.voice.clone())?,
            sink: DeviceCommandSink::new(&config.device),
            capture_duration: config.capture_duration,
        })
    }
}

/// Build the control-surface router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/speak", get(speak))
        .route("/command", get(command))
        .route("/listen", get(listen))
        .route("/wake", get(wake))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the control surface until the process exits
///
/// # Errors
///
/// Returns error if the port cannot be bound
pub async fn serve(config: &Config) -> Result<()> {
    let state = Arc::new(ApiState::new(config)?);
    let app = router(state);

    let addr = format!("127.0.0.1:{}", config.api_port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "control surface listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Root status response
#[derive(Serialize)]
struct HomeResponse {
    status: &'static str,
}

async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        status: "Malayalam voice assistant API running",
    })
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct TextParams {
    #[serde(default)]
    text: String,
}

/// Speak acknowledgment
#[derive(Serialize)]
struct SpeakResponse {
    spoken: String,
}

/// Synthesize and play the given text
async fn speak(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<TextParams>,
) -> std::result::Result<Json<SpeakResponse>, ApiError> {
    if params.text.is_empty() {
        return Err(ApiError::BadRequest("empty text"));
    }

    speak_text(&state, &params.text).await?;
    Ok(Json(SpeakResponse {
        spoken: params.text,
    }))
}

/// Command acknowledgment
#[derive(Serialize)]
struct CommandResponse {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_command: Option<String>,
    terminate: bool,
}

/// Dispatch the given text and execute the resulting side effects
async fn command(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<TextParams>,
) -> std::result::Result<Json<CommandResponse>, ApiError> {
    let result = state.dispatcher.dispatch(&params.text);

    for utterance in &result.utterances {
        speak_text(&state, utterance).await?;
    }

    if let Some(cmd) = &result.device_command {
        // Best-effort; the outcome is logged by the sink
        let _outcome = state.sink.notify(cmd).await;
    }

    Ok(Json(CommandResponse {
        command: params.text,
        device_command: result.device_command,
        terminate: result.terminate,
    }))
}

/// Transcription result
#[derive(Serialize)]
struct ListenResponse {
    text: String,
}

/// Run one capture/filter/transcribe pass
async fn listen(
    State(state): State<Arc<ApiState>>,
) -> std::result::Result<Json<ListenResponse>, ApiError> {
    let duration = state.capture_duration;
    let capture_state = Arc::clone(&state);

    let wav = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let capture = AudioCapture::new()?;
        let samples = capture.record(duration)?;
        let filtered = capture_state.filter.apply(&samples)?;
        samples_to_wav(&filtered, SAMPLE_RATE)
    })
    .await
    .map_err(|e| ApiError::Capture(e.to_string()))?
    .map_err(|e| ApiError::Capture(e.to_string()))?;

    // Fail-soft: recognition trouble reads as empty text
    let text = state.stt.transcribe(&wav).await.unwrap_or_default();
    Ok(Json(ListenResponse { text }))
}

/// Wake acknowledgment
#[derive(Serialize)]
struct WakeResponse {
    status: &'static str,
}

/// Speak the profile greeting
async fn wake(
    State(state): State<Arc<ApiState>>,
) -> std::result::Result<Json<WakeResponse>, ApiError> {
    let greeting = state.dispatcher.greeting().to_string();
    speak_text(&state, &greeting).await?;
    Ok(Json(WakeResponse {
        status: "wake response sent",
    }))
}

/// Synthesize and play text, blocking playback on a worker thread
async fn speak_text(state: &Arc<ApiState>, text: &str) -> std::result::Result<(), ApiError> {
    let audio = state
        .tts
        .synthesize(text)
        .await
        .map_err(|e| ApiError::Synthesis(e.to_string()))?;

    tokio::task::spawn_blocking(move || -> Result<()> {
        let playback = AudioPlayback::new()?;
        playback.play_mp3(&audio)
    })
    .await
    .map_err(|e| ApiError::Playback(e.to_string()))?
    .map_err(|e| ApiError::Playback(e.to_string()))?;

    Ok(())
}

/// Control-surface errors
#[derive(Debug)]
enum ApiError {
    BadRequest(&'static str),
    Capture(String),
    Synthesis(String),
    Playback(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::Capture(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "capture_failed", msg),
            Self::Synthesis(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_failed", msg),
            Self::Playback(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "playback_failed", msg),
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
