//! `SubtitleServer` — the axum HTTP façade.
//!
//! Accepts uploads, creates jobs, spawns one orchestrator task per job,
//! and exposes the polling status endpoint. Background phase failures are
//! never synchronous HTTP errors; they are only visible in the status
//! record.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use subgen_core::{Job, language_from_code};
use subgen_stt::Transcriber;
use subgen_translate::TranslationClient;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::jobs::JobStore;
use crate::orchestrator::{JobRequest, run_job};
use crate::shutdown::ShutdownCoordinator;

/// Assumed upload bitrate (~32 kbps mono MP3, the client's normalized
/// output), used to estimate duration from byte length without decoding.
const BYTES_PER_SECOND: usize = 4000;

/// Interval between eviction sweeps of finished jobs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared state accessible from axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Job status store.
    pub store: Arc<JobStore>,
    /// Speech-to-text provider.
    pub transcriber: Arc<dyn Transcriber>,
    /// Translation provider.
    pub translator: Arc<dyn TranslationClient>,
    /// Server configuration.
    pub config: ServerConfig,
    /// When the server started.
    pub start_time: Instant,
}

/// Response body for `GET /`.
#[derive(Serialize)]
struct HealthResponse {
    message: &'static str,
    uptime_secs: u64,
}

/// Response body for an accepted upload.
#[derive(Serialize)]
struct UploadAccepted {
    task_id: String,
    message: &'static str,
}

/// The subtitle generation server.
pub struct SubtitleServer {
    state: AppState,
    shutdown: Arc<ShutdownCoordinator>,
}

impl SubtitleServer {
    /// Create a new server over the given providers.
    pub fn new(
        config: ServerConfig,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn TranslationClient>,
    ) -> Self {
        Self {
            state: AppState {
                store: Arc::new(JobStore::new()),
                transcriber,
                translator,
                config,
                start_time: Instant::now(),
            },
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Build the axum router with all routes and layers.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(health_handler))
            .route("/generate-subtitle", post(generate_subtitle_handler))
            .route("/status/{task_id}", get(status_handler))
            .layer(DefaultBodyLimit::max(self.state.config.max_upload_bytes))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Get the job store.
    pub fn store(&self) -> &Arc<JobStore> {
        &self.state.store
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Bind and serve until shutdown; also starts the eviction sweeper.
    ///
    /// Returns the bound address and the serve task handle.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = tokio::net::TcpListener::bind((
            self.state.config.host.as_str(),
            self.state.config.port,
        ))
        .await?;
        let addr = listener.local_addr()?;

        let app = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
        });

        self.spawn_sweeper();

        info!(%addr, "subtitle server listening");
        Ok((addr, handle))
    }

    /// Periodically evict finished jobs past the retention window.
    fn spawn_sweeper(&self) {
        let store = self.state.store.clone();
        let retention = Duration::from_secs(self.state.config.retention_secs);
        let token = self.shutdown.token();
        let _ = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let _ = store.evict_finished(retention);
                    }
                    () = token.cancelled() => break,
                }
            }
        });
    }
}

/// GET /
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Subtitle Generator API is running!",
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Parsed fields of the upload form.
#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    target_lang: Option<String>,
    source_lang: Option<String>,
    context: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidUpload(format!("failed to read file: {e}")))?;
                form.file = Some((file_name, bytes.to_vec()));
            }
            "target_lang" | "source_lang" | "context" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidUpload(format!("failed to read {name}: {e}")))?;
                match name.as_str() {
                    "target_lang" => form.target_lang = Some(value),
                    "source_lang" => form.source_lang = Some(value),
                    _ => form.context = Some(value),
                }
            }
            // Unknown fields are ignored, matching lenient form handling
            _ => {}
        }
    }

    Ok(form)
}

/// POST /generate-subtitle
async fn generate_subtitle_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadAccepted>), ApiError> {
    let form = read_form(multipart).await?;

    let (file_name, audio) = form
        .file
        .ok_or_else(|| ApiError::InvalidUpload("missing file field".into()))?;
    if audio.is_empty() {
        return Err(ApiError::InvalidUpload("empty audio file".into()));
    }

    let estimated_secs = (audio.len() / BYTES_PER_SECOND) as u64;
    if estimated_secs > state.config.max_duration_secs {
        return Err(ApiError::InvalidUpload(format!(
            "audio too long: about {} minutes, maximum allowed {} minutes",
            estimated_secs / 60,
            state.config.max_duration_secs / 60
        )));
    }

    let target_code = form.target_lang.unwrap_or_else(|| "en".to_string());
    if language_from_code(&target_code).is_none() {
        return Err(ApiError::UnsupportedLanguage(target_code));
    }

    let source_lang = form
        .source_lang
        .filter(|s| !s.is_empty() && s != "auto");

    let job = state.store.create();
    info!(
        task_id = %job.id,
        file = %file_name,
        bytes = audio.len(),
        target_lang = %target_code,
        "upload accepted"
    );

    let request = JobRequest {
        audio,
        file_name,
        source_lang,
        target_lang: target_code,
        context: form.context.filter(|c| !c.trim().is_empty()),
    };
    let _ = tokio::spawn(run_job(
        state.store.clone(),
        state.transcriber.clone(),
        state.translator.clone(),
        state.config.chunk_size,
        job.id.clone(),
        request,
    ));

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadAccepted {
            task_id: job.id,
            message: "File uploaded successfully. Processing in background.",
        }),
    ))
}

/// GET /status/{task_id}
async fn status_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    state
        .store
        .get(&task_id)
        .map(Json)
        .ok_or(ApiError::JobNotFound(task_id))
}
